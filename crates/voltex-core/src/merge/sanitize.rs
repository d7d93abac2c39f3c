/// Make a name safe to use as a directory name on NTFS.
///
/// `" | % : / , \` become spaces, `[` and `<` become `(`, `]` and `>`
/// become `)`. Trailing spaces and periods are removed.
pub fn sanitize(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '"' | '|' | '%' | ':' | '/' | ',' | '\\' => ' ',
            '[' | '<' => '(',
            ']' | '>' => ')',
            other => other,
        })
        .collect();
    replaced.trim_end_matches([' ', '.']).to_string()
}
