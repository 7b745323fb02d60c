//! Named extraction fields and their configured selectors.
//!
//! Every logical field the crawler reads is a variant of [`Field`]. The
//! [`FieldTable`] binds each variant to a parsed selector and an optional
//! attribute once, at load time, so extraction never looks anything up by
//! string.

use scraper::Selector;

use super::ConfigError;

/// A logical field extracted from a listing row or a product page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// List price inside a listing row.
    ProductsPrice,
    /// Discounted price inside a listing row.
    ProductsFinalPrice,
    /// Product page link inside a listing row.
    ProductsUrl,
    /// Seller name on a product page.
    ProductSeller,
    /// Image URL on a product page.
    ProductImage,
    /// Title on a product page.
    ProductTitle,
    /// Price on a product page.
    ProductPrice,
    /// Next listing page link.
    NextPage,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::ProductsPrice,
        Field::ProductsFinalPrice,
        Field::ProductsUrl,
        Field::ProductSeller,
        Field::ProductImage,
        Field::ProductTitle,
        Field::ProductPrice,
        Field::NextPage,
    ];

    /// Configuration key holding this field's selector.
    pub fn key(self) -> &'static str {
        match self {
            Field::ProductsPrice => "css_products_price",
            Field::ProductsFinalPrice => "css_products_final_price",
            Field::ProductsUrl => "css_products_url",
            Field::ProductSeller => "css_product_seller",
            Field::ProductImage => "css_product_image",
            Field::ProductTitle => "css_product_title",
            Field::ProductPrice => "css_product_price",
            Field::NextPage => "css_next_page",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key().trim_start_matches("css_"))
    }
}

/// Selector and optional attribute bound to one field.
#[derive(Debug, Clone)]
pub struct FieldSelector {
    /// Parsed selector; `None` when the configuration left it empty.
    pub selector: Option<Selector>,
    /// Attribute to read instead of the element text.
    pub attribute: Option<String>,
}

impl FieldSelector {
    /// Parse a selector/attribute pair from raw configuration strings.
    pub fn parse(field: Field, css: &str, attribute: &str) -> Result<Self, ConfigError> {
        let css = css.trim();
        let selector = if css.is_empty() {
            None
        } else {
            let parsed = Selector::parse(css).map_err(|e| ConfigError::Selector {
                key: field.key().to_string(),
                message: e.to_string(),
            })?;
            Some(parsed)
        };

        let attribute = attribute.trim();
        let attribute = (!attribute.is_empty()).then(|| attribute.to_string());

        Ok(Self {
            selector,
            attribute,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.selector.is_some()
    }
}

/// Lookup table from [`Field`] to its selector, total over all fields.
#[derive(Debug, Clone)]
pub struct FieldTable {
    entries: [FieldSelector; Field::ALL.len()],
}

impl FieldTable {
    /// Build the table from `(field, css, attribute)` triples.
    ///
    /// Fields missing from `pairs` are left unconfigured.
    pub fn build<'a, I>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (Field, &'a str, &'a str)>,
    {
        let mut entries = Field::ALL.map(|_| FieldSelector {
            selector: None,
            attribute: None,
        });

        for (field, css, attribute) in pairs {
            entries[field.index()] = FieldSelector::parse(field, css, attribute)?;
        }

        Ok(Self { entries })
    }

    pub fn get(&self, field: Field) -> &FieldSelector {
        &self.entries[field.index()]
    }
}
