use crate::projection::GhostOverlay;
use yew::prelude::*;

/// Props for the loading overlay drawn over pending ghosts
#[derive(Properties, Clone, PartialEq)]
pub struct GhostOverlayProps {
    /// Ghost rectangles, already projected to viewport pixels
    #[prop_or_default]
    pub overlays: Vec<GhostOverlay>,
}

/// Decorative layer above the scene: shimmer, pulsing glow, spinner, prompt
/// and a "Generating..." badge per pending ghost. Ignores pointer events.
#[function_component(GhostOverlayLayer)]
pub fn ghost_overlay_layer(props: &GhostOverlayProps) -> Html {
    let items: Html = props
        .overlays
        .iter()
        .map(|overlay| {
            let rect = overlay.rect;
            let prompt = overlay.prompt.as_ref().map(|prompt| {
                html! {
                    <div class="text-center max-w-[80%]">
                        <p class="text-xs text-white/60 font-mono line-clamp-2">{prompt.clone()}</p>
                    </div>
                }
            });

            html! {
                <div
                    key={overlay.id.clone()}
                    data-ghost-id={overlay.id.clone()}
                    class="ghost-overlay rounded-lg overflow-hidden border-2"
                    style={format!(
                        "position: absolute; left: {}px; top: {}px; width: {}px; height: {}px; \
                         pointer-events: none; z-index: 1000; border-color: rgba(208, 0, 0, 0.5);",
                        rect.x, rect.y, rect.width, rect.height
                    )}
                >
                    // Shimmer background
                    <div class="absolute inset-0 bg-gradient-to-br from-slate-800 via-slate-900 to-black">
                        <div class="ghost-shimmer absolute inset-0 bg-gradient-to-r from-transparent via-white/10 to-transparent" style="width: 50%;" />
                    </div>

                    // Pulsing glow
                    <div class="ghost-glow absolute inset-0 blur-xl" style="background-color: rgba(208, 0, 0, 0.1);" />

                    // Spinner and prompt
                    <div class="absolute inset-0 flex flex-col items-center justify-center gap-4 p-4">
                        <div
                            class="ghost-spinner w-12 h-12 border-4 rounded-full"
                            style="border-color: rgba(208, 0, 0, 0.3); border-top-color: #d00000;"
                        />
                        {prompt}
                    </div>

                    // Corner badge
                    <div
                        class="absolute top-2 right-2 px-2 py-1 rounded text-xs font-bold text-white uppercase tracking-wider"
                        style="background-color: rgba(208, 0, 0, 0.9);"
                    >
                        {"Generating..."}
                    </div>
                </div>
            }
        })
        .collect();

    html! {
        <div
            class="ghost-overlay-layer"
            style="position: absolute; inset: 0; overflow: hidden; pointer-events: none;"
        >
            {items}
        </div>
    }
}
