/// The in-page capture and selector-count script.
/// Backends inject this string and then call `window.Loci.process(request)`.
pub const SCANNER_JS: &str = include_str!("scanner.js");
