pub mod content;
pub mod my_list;
pub mod watch_progress;

pub use content::PostgresContentRepository;
pub use my_list::PostgresMyListRepository;
pub use watch_progress::PostgresWatchProgressRepository;

/// Escape `%`, `_` and `\` so user input matches literally inside ILIKE.
pub(crate) fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
