//! Naming rules: table to class, column to accessor, `*_id` to relation

use heck::ToUpperCamelCase;

/// Strip an English plural suffix.
///
/// `ies` becomes `y`; `sses`, `xes`, `ches`, `shes` and `zes` lose `es`, as
/// does `uses` after a consonant (`statuses`, `campuses`); any other trailing
/// `s` is dropped unless the word ends in `ss`, `us` or `is`, so `houses`
/// becomes `house`. Applying it twice gives the same result as once.
pub fn singularize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    let stem = |n: usize| &word[..word.len() - n];

    if lower.len() > 3 && lower.ends_with("ies") {
        let y = if word.ends_with("IES") { "Y" } else { "y" };
        return format!("{}{}", stem(3), y);
    }
    if lower.len() > 4 && lower.ends_with("uses") {
        let before = lower.as_bytes()[lower.len() - 5];
        if !b"aeiou".contains(&before) {
            return stem(2).to_string();
        }
    }
    for suffix in ["sses", "xes", "ches", "shes", "zes"] {
        if lower.len() > suffix.len() && lower.ends_with(suffix) {
            return stem(2).to_string();
        }
    }
    if lower.len() > 1
        && lower.ends_with('s')
        && !["ss", "us", "is"].iter().any(|keep| lower.ends_with(keep))
    {
        return stem(1).to_string();
    }
    word.to_string()
}

/// Convert a table name to a class name.
///
/// Every `_`-separated segment is singularized and capitalised:
/// `category_items` becomes `CategoryItem`.
pub fn class_name(table_name: &str) -> String {
    table_name
        .split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| singularize(segment).to_upper_camel_case())
        .collect()
}

/// Convert a column name to the suffix of its getter and setter:
/// `first_name` becomes `FirstName`.
pub fn accessor_name(column_name: &str) -> String {
    column_name.to_upper_camel_case()
}

/// Mapper class for a model class, e.g. `ShopUser` -> `ShopUserMapper`
pub fn mapper_class_name(model_class: &str) -> String {
    format!("{}Mapper", model_class)
}

/// File a class is stored in.
///
/// With translation on the class casing is kept; otherwise the name is
/// lowercased.
pub fn class_file_name(class: &str, translation: bool) -> String {
    if translation {
        format!("{}.php", class)
    } else {
        format!("{}.php", class.to_lowercase())
    }
}

/// Relation implied by a `<stem>_id` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Cache property holding the related object, e.g. `category`
    pub property: String,
    /// Accessor suffix, e.g. `Category`
    pub accessor: String,
    /// Related model class, prefix included
    pub class: String,
}

/// Detect a `<stem>_id` column. The bare `id` column never is one.
pub fn foreign_key(column_name: &str, model_prefix: &str) -> Option<ForeignKey> {
    let stem = column_name.strip_suffix("_id")?;
    if stem.is_empty() || stem.ends_with('_') {
        return None;
    }
    let accessor = accessor_name(stem);
    Some(ForeignKey {
        property: stem.to_string(),
        class: format!("{}{}", model_prefix, accessor),
        accessor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("users"), "user");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("statuses"), "status");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("matches"), "match");
        assert_eq!(singularize("dishes"), "dish");
        assert_eq!(singularize("quizzes"), "quizz");
        assert_eq!(singularize("days"), "day");

        // already singular
        assert_eq!(singularize("status"), "status");
        assert_eq!(singularize("address"), "address");
        assert_eq!(singularize("analysis"), "analysis");
        assert_eq!(singularize("item"), "item");
        assert_eq!(singularize("s"), "s");
    }

    #[test]
    fn test_singularize_is_idempotent() {
        for word in [
            "users", "categories", "addresses", "statuses", "boxes", "series", "news", "cases",
            "Items", "CATEGORIES",
        ] {
            let once = singularize(word);
            assert_eq!(singularize(&once), once, "{}", word);
        }
    }

    #[test]
    fn test_class_name() {
        assert_eq!(class_name("users"), "User");
        assert_eq!(class_name("category_items"), "CategoryItem");
        assert_eq!(class_name("categories"), "Category");
        assert_eq!(class_name("user_addresses"), "UserAddress");
        assert_eq!(class_name("order_statuses"), "OrderStatus");
        assert_eq!(class_name("news_items"), "NewItem");
        assert_eq!(class_name("person"), "Person");
        assert_eq!(class_name("campuses"), "Campus");
        assert_eq!(class_name("houses"), "House");
        assert_eq!(class_name("causes"), "Cause");
        assert_eq!(class_name("warehouses"), "Warehouse");
    }

    #[test]
    fn test_class_name_is_idempotent() {
        for table in [
            "users",
            "category_items",
            "categories",
            "order_statuses",
            "user_addresses",
            "boxes",
            "warehouses",
            "bonuses",
            "audit_log",
        ] {
            let class = class_name(table);
            assert_eq!(class_name(&class), class, "{}", table);
        }
    }

    #[test]
    fn test_accessor_name() {
        assert_eq!(accessor_name("id"), "Id");
        assert_eq!(accessor_name("first_name"), "FirstName");
        assert_eq!(accessor_name("user_id"), "UserId");
        // no singularizing for columns
        assert_eq!(accessor_name("items"), "Items");
    }

    #[test]
    fn test_foreign_key() {
        let fk = foreign_key("category_id", "Shop").unwrap();
        assert_eq!(fk.property, "category");
        assert_eq!(fk.accessor, "Category");
        assert_eq!(fk.class, "ShopCategory");

        let fk = foreign_key("parent_item_id", "").unwrap();
        assert_eq!(fk.accessor, "ParentItem");
        assert_eq!(fk.class, "ParentItem");

        assert!(foreign_key("id", "").is_none());
        assert!(foreign_key("_id", "").is_none());
        assert!(foreign_key("paid", "").is_none());
        assert!(foreign_key("user_identifier", "").is_none());
    }

    #[test]
    fn test_class_file_name() {
        assert_eq!(class_file_name("ShopUser", true), "ShopUser.php");
        assert_eq!(class_file_name("ShopUser", false), "shopuser.php");
        assert_eq!(mapper_class_name("ShopUser"), "ShopUserMapper");
    }
}
