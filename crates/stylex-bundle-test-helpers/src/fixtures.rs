//! Output bundles shaped like real framework builds

use stylex_bundle_core::bundle::{OutputAsset, OutputBundle, OutputChunk};
use stylex_bundle_core::PLACEHOLDER_MARKER;

pub const REMIX_ROOT_CSS: &str = "assets/root-AbCd1234.css";
pub const REMIX_ROOT_CHUNK: &str = "assets/root-Xy12Ab34.js";
pub const REMIX_ROUTE_CHUNK: &str = "assets/_index-Qw12Er34.js";
pub const REMIX_ENTRY_CHUNK: &str = "assets/entry.client-Lm90Np12.js";

/// One root stylesheet carrying the marker, imported by the root chunk and
/// a route chunk through their CSS dependency lists.
pub fn remix_bundle() -> OutputBundle {
    let mut bundle = OutputBundle::new();
    bundle.insert_asset(OutputAsset::new(
        REMIX_ROOT_CSS,
        format!("html{{margin:0}}\n{PLACEHOLDER_MARKER}\n"),
    ));
    bundle.insert_chunk(
        OutputChunk::new(REMIX_ENTRY_CHUNK, "import \"./root-Xy12Ab34.js\";")
            .entry()
            .with_import(REMIX_ROOT_CHUNK),
    );
    bundle.insert_chunk(
        OutputChunk::new(REMIX_ROOT_CHUNK, "export default function App() {}")
            .with_css(REMIX_ROOT_CSS),
    );
    bundle.insert_chunk(
        OutputChunk::new(REMIX_ROUTE_CHUNK, "export default function Index() {}")
            .with_import(REMIX_ROOT_CHUNK)
            .with_css(REMIX_ROOT_CSS),
    );
    bundle
}

pub const SVELTEKIT_LAYOUT_CSS: &str = "_app/immutable/assets/0.AbCd1234.css";
pub const SVELTEKIT_LAYOUT_CHUNK: &str = "_app/immutable/nodes/0.Zx98Yw76.js";
pub const SVELTEKIT_PAGE_CSS: &str = "_app/immutable/assets/2.Mn56Op78.css";
pub const SVELTEKIT_PAGE_CHUNK: &str = "_app/immutable/nodes/2.Gh34Jk56.js";
pub const SVELTEKIT_APP_CHUNK: &str = "_app/immutable/entry/app.Rt45Yu67.js";

/// Two route stylesheets carrying the marker. The layout stylesheet is in
/// its chunk's CSS list; the page stylesheet is only named in chunk code.
pub fn sveltekit_bundle() -> OutputBundle {
    let mut bundle = OutputBundle::new();
    bundle.insert_asset(OutputAsset::new(
        SVELTEKIT_LAYOUT_CSS,
        format!("{PLACEHOLDER_MARKER}\nnav{{display:flex}}\n"),
    ));
    bundle.insert_asset(OutputAsset::new(
        SVELTEKIT_PAGE_CSS,
        format!("main{{padding:0}}\n{PLACEHOLDER_MARKER}\n"),
    ));
    bundle.insert_chunk(
        OutputChunk::new(
            SVELTEKIT_APP_CHUNK,
            "const nodes = [() => import(\"../nodes/0.Zx98Yw76.js\"), () => import(\"../nodes/2.Gh34Jk56.js\")];",
        )
        .entry()
        .with_dynamic_import(SVELTEKIT_LAYOUT_CHUNK)
        .with_dynamic_import(SVELTEKIT_PAGE_CHUNK),
    );
    bundle.insert_chunk(
        OutputChunk::new(SVELTEKIT_LAYOUT_CHUNK, "export const component = {};")
            .with_css(SVELTEKIT_LAYOUT_CSS),
    );
    bundle.insert_chunk(OutputChunk::new(
        SVELTEKIT_PAGE_CHUNK,
        "export const css = [\"../assets/2.Mn56Op78.css\"];\nexport const component = {};",
    ));
    bundle
}

/// One layout stylesheet carrying the marker that no CSS index lists. Both
/// node chunks name it in code, as SvelteKit does for layout CSS shared by
/// every page below the layout.
pub fn sveltekit_shared_layout_bundle() -> OutputBundle {
    let mut bundle = OutputBundle::new();
    bundle.insert_asset(OutputAsset::new(
        SVELTEKIT_LAYOUT_CSS,
        format!("{PLACEHOLDER_MARKER}\nnav{{display:flex}}\n"),
    ));
    bundle.insert_chunk(
        OutputChunk::new(
            SVELTEKIT_APP_CHUNK,
            "const nodes = [() => import(\"../nodes/0.Zx98Yw76.js\"), () => import(\"../nodes/2.Gh34Jk56.js\")];",
        )
        .entry()
        .with_dynamic_import(SVELTEKIT_LAYOUT_CHUNK)
        .with_dynamic_import(SVELTEKIT_PAGE_CHUNK),
    );
    bundle.insert_chunk(OutputChunk::new(
        SVELTEKIT_LAYOUT_CHUNK,
        "export const css = [\"../assets/0.AbCd1234.css\"];\nexport const component = {};",
    ));
    bundle.insert_chunk(OutputChunk::new(
        SVELTEKIT_PAGE_CHUNK,
        "export const css = [\"../assets/0.AbCd1234.css\", \"../assets/2.Mn56Op78.css\"];\nexport const component = {};",
    ));
    bundle
}

/// A bundle without any framework stylesheet.
pub fn plain_bundle() -> OutputBundle {
    let mut bundle = OutputBundle::new();
    bundle.insert_chunk(OutputChunk::new("assets/index-Ab12Cd34.js", "console.log(1);").entry());
    bundle
}
