//! Product image records and input normalization.
//!
//! Clients submit images either as bare URL strings or as structured
//! objects. Both shapes are folded into [`ImageRecord`] here, and nowhere
//! else: the single-primary invariant is only enforceable if every image
//! list passes through [`normalize_images`].

use serde::{Deserialize, Serialize};

/// Hard cap on the number of images kept per product.
pub const MAX_PRODUCT_IMAGES: usize = 10;

/// A canonical product image.
///
/// Within a product's image list, exactly one record has `is_primary`
/// set whenever the list is non-empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub url: String,
    pub alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(rename = "isPrimary")]
    pub is_primary: bool,
}

/// A client-supplied image in either accepted shape.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RawImage {
    /// A bare URL string.
    Url(String),
    /// A structured image object.
    Object {
        #[serde(default)]
        url: String,
        #[serde(default)]
        alt: Option<String>,
        #[serde(default)]
        thumbnail: Option<String>,
        #[serde(default, rename = "isPrimary")]
        is_primary: Option<bool>,
    },
}

impl RawImage {
    fn trimmed_url(&self) -> Option<&str> {
        let url = match self {
            Self::Url(s) => s.trim(),
            Self::Object { url, .. } => url.trim(),
        };
        if url.is_empty() { None } else { Some(url) }
    }
}

fn default_alt(index: usize) -> String {
    format!("Product image {}", index + 1)
}

fn trimmed_nonempty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Normalize client-supplied images into canonical records.
///
/// Entries without a usable URL are dropped, the list is capped at
/// [`MAX_PRODUCT_IMAGES`] preserving order, and the single-primary
/// invariant is enforced unconditionally: clients routinely send zero or
/// several primary flags, so the first flagged record wins (index 0 when
/// none is flagged). An empty input yields an empty output.
pub fn normalize_images(raw: Vec<RawImage>) -> Vec<ImageRecord> {
    let mut records: Vec<ImageRecord> = raw
        .iter()
        .filter(|img| img.trimmed_url().is_some())
        .take(MAX_PRODUCT_IMAGES)
        .enumerate()
        .map(|(index, img)| {
            let url = img.trimmed_url().unwrap_or_default().to_string();
            match img {
                RawImage::Url(_) => ImageRecord {
                    url,
                    alt: default_alt(index),
                    thumbnail: None,
                    is_primary: index == 0,
                },
                RawImage::Object {
                    alt,
                    thumbnail,
                    is_primary,
                    ..
                } => ImageRecord {
                    url,
                    alt: trimmed_nonempty(alt).unwrap_or_else(|| default_alt(index)),
                    thumbnail: trimmed_nonempty(thumbnail),
                    is_primary: is_primary.unwrap_or(false),
                },
            }
        })
        .collect();

    if !records.is_empty() {
        let primary = records
            .iter()
            .position(|img| img.is_primary)
            .unwrap_or(0);
        for (index, record) in records.iter_mut().enumerate() {
            record.is_primary = index == primary;
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> RawImage {
        RawImage::Url(s.to_string())
    }

    fn object(url: &str, alt: Option<&str>, is_primary: Option<bool>) -> RawImage {
        RawImage::Object {
            url: url.to_string(),
            alt: alt.map(str::to_string),
            thumbnail: None,
            is_primary,
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(normalize_images(vec![]).is_empty());
    }

    #[test]
    fn strings_get_generated_alt_and_first_is_primary() {
        let records = normalize_images(vec![url(" a.jpg "), url("b.jpg")]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].url, "a.jpg");
        assert_eq!(records[0].alt, "Product image 1");
        assert!(records[0].is_primary);
        assert_eq!(records[1].alt, "Product image 2");
        assert!(!records[1].is_primary);
    }

    #[test]
    fn unusable_entries_are_dropped() {
        let records = normalize_images(vec![
            url("   "),
            object("", Some("alt"), Some(true)),
            url("keep.jpg"),
        ]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "keep.jpg");
        assert!(records[0].is_primary);
    }

    #[test]
    fn list_is_capped_at_ten_preserving_prefix_order() {
        let raw: Vec<RawImage> = (0..15).map(|i| url(&format!("img{i}.jpg"))).collect();
        let records = normalize_images(raw);
        assert_eq!(records.len(), MAX_PRODUCT_IMAGES);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.url, format!("img{i}.jpg"));
        }
    }

    #[test]
    fn exactly_one_primary_with_zero_one_or_many_flags() {
        // No flags set: index 0 wins.
        let none = normalize_images(vec![
            object("a.jpg", None, None),
            object("b.jpg", None, Some(false)),
        ]);
        assert_eq!(none.iter().filter(|i| i.is_primary).count(), 1);
        assert!(none[0].is_primary);

        // One flag set: it wins.
        let one = normalize_images(vec![
            object("a.jpg", None, None),
            object("b.jpg", None, Some(true)),
            object("c.jpg", None, None),
        ]);
        assert_eq!(one.iter().filter(|i| i.is_primary).count(), 1);
        assert!(one[1].is_primary);

        // Many flags set: the first wins.
        let many = normalize_images(vec![
            object("a.jpg", None, Some(false)),
            object("b.jpg", None, Some(true)),
            object("c.jpg", None, Some(true)),
        ]);
        assert_eq!(many.iter().filter(|i| i.is_primary).count(), 1);
        assert!(many[1].is_primary);
        assert!(!many[2].is_primary);
    }

    #[test]
    fn object_fields_are_preserved_and_trimmed() {
        let records = normalize_images(vec![RawImage::Object {
            url: " x.jpg ".to_string(),
            alt: Some(" Front view ".to_string()),
            thumbnail: Some(" x-thumb.jpg ".to_string()),
            is_primary: Some(true),
        }]);
        assert_eq!(records[0].url, "x.jpg");
        assert_eq!(records[0].alt, "Front view");
        assert_eq!(records[0].thumbnail.as_deref(), Some("x-thumb.jpg"));
        assert!(records[0].is_primary);
    }

    #[test]
    fn blank_alt_falls_back_to_generated() {
        let records = normalize_images(vec![object("x.jpg", Some("  "), None)]);
        assert_eq!(records[0].alt, "Product image 1");
    }

    #[test]
    fn raw_image_deserializes_both_shapes() {
        let raw: Vec<RawImage> = serde_json::from_str(
            r#"["plain.jpg", {"url": "obj.jpg", "alt": "A", "isPrimary": true}]"#,
        )
        .unwrap();
        let records = normalize_images(raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].url, "obj.jpg");
        assert!(records[1].is_primary);
        assert!(!records[0].is_primary);
    }
}
