//! Cursor derivation for offset-paginated list endpoints.

use url::Url;

use super::types::ListPage;

/// Offset of the page after `page`, read from the `offset` query parameter
/// of its `next` URL.
///
/// Returns None (end of list) when there is no `next` link, it cannot be
/// parsed, it carries no valid offset, or the offset would not advance past
/// `current_offset`.
pub fn next_offset(page: &ListPage, current_offset: u32) -> Option<u32> {
  let next = page.next.as_deref()?;
  let url = Url::parse(next).ok()?;
  let offset = url
    .query_pairs()
    .find(|(key, _)| key == "offset")
    .and_then(|(_, value)| value.parse::<u32>().ok())?;

  (offset > current_offset).then_some(offset)
}
