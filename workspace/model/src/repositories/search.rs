use sea_orm::sea_query::LikeExpr;

/// Needs no quoting in any backend's string literal syntax.
const ESCAPE: char = '!';

/// `LIKE` pattern matching `term` anywhere in the column.
///
/// Wildcards typed by the user are escaped, so `%` and `_` only match
/// themselves.
pub fn contains(term: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_wildcards(term))).escape(ESCAPE)
}

fn escape_wildcards(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | ESCAPE) {
            escaped.push(ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}
