//! Naming helpers shared by the schema deriver and the flattener.

/// Convert an XML tag name to a snake_case column or table name.
///
/// Every uppercase letter except a leading one starts a new word, so runs of
/// capitals are split letter by letter (`StopPlaceRef` -> `stop_place_ref`,
/// `ABC` -> `a_b_c`).
pub fn camel_to_snake(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}
