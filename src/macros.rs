/// Compile a literal pattern once and hand out a `&'static Regex`.
///
/// Used for the small standalone regexes (scorer signals, year detection,
/// tokenisation). The case grammar itself is composed at runtime and lives in
/// `rules::Registry`.
#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}
