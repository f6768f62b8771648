/// Returns true when `value` is exactly one entry of the comma separated `list`.
///
/// Entries are compared byte for byte with no trimming. An empty list has no
/// entries, while a trailing comma ends the list with an empty entry.
pub fn list_contains(value: &str, list: &str) -> bool {
    !list.is_empty() && list.split(',').any(|entry| entry == value)
}
