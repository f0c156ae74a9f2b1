use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use starposter::rendering::text::Typesetter;
use starposter::{FontGate, FontSources, PosterConfig, PosterStudio, RenderRequest, Surface};

fn fixture_font() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/DejaVuSerif-Bold.ttf")
}

fn render_with(gate: FontGate, title: &str, subtitle: &str) -> Arc<Surface> {
    let studio = PosterStudio::with_fonts(PosterConfig::default(), gate);
    let status = studio
        .render_blocking(&RenderRequest::new(title, subtitle, 0))
        .expect("render failed");
    assert!(!status.text_fallback());
    status.surface().expect("superseded").clone()
}

fn with_fixture(title: &str, subtitle: &str) -> Arc<Surface> {
    let sources = FontSources {
        system: false,
        files: vec![fixture_font()],
        dirs: Vec::new(),
    };
    render_with(FontGate::new(sources, Duration::from_secs(30)), title, subtitle)
}

fn without_text(title: &str, subtitle: &str) -> Arc<Surface> {
    render_with(FontGate::preloaded(Typesetter::empty()), title, subtitle)
}

fn rgb(s: &Surface, x: u32, y: u32) -> (u8, u8, u8) {
    let p = s.pixmap().pixel(x, y).unwrap().demultiply();
    (p.red(), p.green(), p.blue())
}

/// Pixels in `rows` that differ between the two renders, with their colour in `a`.
fn changed(a: &Surface, b: &Surface, rows: Range<u32>) -> Vec<(u32, u32, (u8, u8, u8))> {
    let mut out = Vec::new();
    for y in rows {
        for x in 0..a.width() {
            let pa = rgb(a, x, y);
            if pa != rgb(b, x, y) {
                out.push((x, y, pa));
            }
        }
    }
    out
}

fn horizontal_centre(pixels: &[(u32, u32, (u8, u8, u8))]) -> i64 {
    let min = pixels.iter().map(|p| p.0).min().unwrap();
    let max = pixels.iter().map(|p| p.0).max().unwrap();
    i64::from(min + max) / 2
}

// Title anchor sits at cy + 0.15 * maxR = 1159, subtitle at cy + 0.28 * maxR ≈ 1232.
const TITLE_ROWS: Range<u32> = 1130..1170;
const SUBTITLE_ROWS: Range<u32> = 1220..1245;

#[test]
fn title_is_centred_and_gilded() {
    let text = with_fixture("HOH", "Stars");
    let plain = without_text("HOH", "Stars");

    let title = changed(&text, &plain, TITLE_ROWS);
    assert!(title.len() > 500, "only {} title pixels", title.len());
    assert!((horizontal_centre(&title) - 800).abs() <= 6);

    // Theme 0 gilds from #f6d365 to #fda085 across cx ± 200.
    let gold = title
        .iter()
        .filter(|(_, _, (r, g, b))| *r > 230 && (150..225).contains(g) && *b < 150)
        .count();
    assert!(gold > 100, "{} gold pixels", gold);
}

#[test]
fn subtitle_is_centred_and_near_white() {
    let text = with_fixture("HOH", "Stars");
    let plain = without_text("HOH", "Stars");

    let subtitle = changed(&text, &plain, SUBTITLE_ROWS);
    assert!(subtitle.len() > 200, "only {} subtitle pixels", subtitle.len());
    assert!((horizontal_centre(&subtitle) - 800).abs() <= 8);
    assert!(subtitle
        .iter()
        .any(|(_, _, (r, g, b))| *r > 220 && *g > 220 && *b > 220));
}

#[test]
fn subtitle_shadow_darkens_beside_glyphs() {
    let text = with_fixture("", "Stars");
    let plain = without_text("", "Stars");

    // The blurred shadow spreads past the glyphs and only ever darkens.
    let darker = changed(&text, &plain, 1190..1210)
        .into_iter()
        .filter(|&(x, y, (r, _, _))| r < rgb(&plain, x, y).0)
        .count();
    assert!(darker > 0);
}

#[test]
fn empty_text_draws_no_glyphs_even_with_fonts() {
    let text = with_fixture("", "");
    let plain = without_text("", "");
    assert_eq!(text.fingerprint(), plain.fingerprint());
}

#[test]
fn very_long_title_still_renders() {
    let title = "W".repeat(4000);
    let text = with_fixture(&title, "");
    let plain = without_text(&title, "");
    let row = changed(&text, &plain, 1150..1151);
    // the run overflows the canvas on both sides
    assert!(row.iter().any(|p| p.0 < 40));
    assert!(row.iter().any(|p| p.0 > 1560));
}
