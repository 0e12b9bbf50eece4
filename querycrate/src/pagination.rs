use crate::errors::QueryError;
use crate::template::clear_tokens;

const SELECT_KEYWORD: &str = "select";

/// Byte offset just past the first `SELECT` keyword and the whitespace character that follows it
fn row_number_insert_point(query: &str) -> Option<usize> {
    let lowered = query.to_ascii_lowercase();
    let bytes = lowered.as_bytes();

    lowered.match_indices(SELECT_KEYWORD).find_map(|(start, _)| {
        let end = start + SELECT_KEYWORD.len();
        let at_boundary = start == 0 || !is_word_byte(bytes[start - 1]);
        let spaced = bytes.get(end).is_some_and(u8::is_ascii_whitespace);
        (at_boundary && spaced).then_some(end + 1)
    })
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Wrap a query in a row-numbered window and keep one page of it.
///
/// # Arguments
///
/// * `query` - The base query. A `ROW_NUMBER()` column is inserted after its first `SELECT`.
/// * `order_by` - Expression that orders the rows before numbering them.
/// * `page_size` - Number of rows per page.
/// * `page_number` - Zero-based page to keep.
///
/// # Returns
///
/// The windowed SQL, on one line, with any leftover `{where}`, `{andWhere}` or `{orderBy}`
/// tokens removed.
///
/// # Errors
///
/// Returns `QueryError::MissingSelect` when `query` has no `SELECT` keyword followed by whitespace.
///
/// ```rust
/// let sql = querycrate::build_paged("SELECT * FROM sys.tables", "[name]", 10, 1).unwrap();
/// assert_eq!(
///     sql,
///     "WITH [source] AS (SELECT ROW_NUMBER() OVER(ORDER BY [name]) AS [RowNumber], * FROM sys.tables) \
///      SELECT * FROM [source] WHERE [RowNumber] BETWEEN 11 AND 20;"
/// );
/// ```
pub fn build_paged(
    query: &str,
    order_by: &str,
    page_size: u64,
    page_number: u64,
) -> Result<String, QueryError> {
    let insert_at = row_number_insert_point(query).ok_or(QueryError::MissingSelect)?;

    let offset = page_number.saturating_mul(page_size);
    let start_record = offset.saturating_add(1);
    let end_record = offset.saturating_add(page_size);

    let numbered = format!(
        "{}ROW_NUMBER() OVER(ORDER BY {order_by}) AS [RowNumber], {}",
        &query[..insert_at],
        &query[insert_at..]
    );
    let sql = format!(
        "WITH [source] AS ({numbered}) SELECT * FROM [source] WHERE [RowNumber] BETWEEN {start_record} AND {end_record};"
    );

    Ok(clear_tokens(&sql))
}
