use markdown::Options;

/// Renders model-written markdown to HTML. GFM extensions are enabled; raw HTML in
/// the input is escaped rather than passed through.
pub fn render_html(source: &str) -> Result<String, String> {
    markdown::to_html_with_options(source, &Options::gfm()).map_err(|e| e.to_string())
}
