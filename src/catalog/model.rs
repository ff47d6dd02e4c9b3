//! Product documents and their request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Closed set of product categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Men,
    Women,
    Kids,
    Accessories,
    Shoes,
    Sportswear,
    Formal,
    Casual,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Men => "men",
            Category::Women => "women",
            Category::Kids => "kids",
            Category::Accessories => "accessories",
            Category::Shoes => "shoes",
            Category::Sportswear => "sportswear",
            Category::Formal => "formal",
            Category::Casual => "casual",
        }
    }
}

/// Closed set of garment sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Size {
    #[serde(rename = "XS")]
    Xs,
    S,
    M,
    L,
    #[serde(rename = "XL")]
    Xl,
    #[serde(rename = "XXL")]
    Xxl,
    #[serde(rename = "XXXL")]
    Xxxl,
    #[serde(rename = "One Size")]
    OneSize,
}

impl Size {
    pub fn as_str(&self) -> &'static str {
        match self {
            Size::Xs => "XS",
            Size::S => "S",
            Size::M => "M",
            Size::L => "L",
            Size::Xl => "XL",
            Size::Xxl => "XXL",
            Size::Xxxl => "XXXL",
            Size::OneSize => "One Size",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Units available for one size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeStock {
    pub size: Size,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Color {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    #[validate(length(min = 1))]
    pub url: String,
    #[serde(default)]
    pub is_main: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specifications {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub care_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<f64>,
    pub category: Category,
    pub subcategory: String,
    pub brand: String,
    pub sizes: Vec<SizeStock>,
    #[serde(default)]
    pub colors: Vec<Color>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    pub rating: f64,
    pub num_reviews: u32,
    pub is_featured: bool,
    pub is_active: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub specifications: Specifications,
    /// Units sold through orders
    #[serde(default)]
    pub sold: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Build a product from a validated creation payload
    pub fn from_input(input: ProductInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            description: input.description,
            price: input.price,
            discount_price: input.discount_price,
            category: input.category,
            subcategory: input.subcategory,
            brand: input.brand,
            sizes: input.sizes,
            colors: input.colors,
            images: input.images,
            rating: input.rating.unwrap_or(5.0),
            num_reviews: 0,
            is_featured: input.is_featured.unwrap_or(false),
            is_active: input.is_active.unwrap_or(true),
            tags: input.tags,
            specifications: input.specifications.unwrap_or_default(),
            sold: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Quantity on hand for a size, `None` if the size is not offered
    pub fn stock_for(&self, size: Size) -> Option<u32> {
        self.sizes.iter().find(|s| s.size == size).map(|s| s.quantity)
    }

    /// Sum of all per-size quantities
    pub fn total_stock(&self) -> u64 {
        self.sizes.iter().map(|s| u64::from(s.quantity)).sum()
    }

    pub fn in_stock(&self) -> bool {
        self.total_stock() > 0
    }

    /// Price a buyer pays: the discount price when set and non-zero
    pub fn final_price(&self) -> f64 {
        self.discount_price
            .filter(|discount| *discount > 0.0)
            .unwrap_or(self.price)
    }

    /// Image flagged as main, else the first image
    pub fn main_image(&self) -> Option<&str> {
        self.images
            .iter()
            .find(|img| img.is_main)
            .or_else(|| self.images.first())
            .map(|img| img.url.as_str())
    }

    /// Apply a validated patch; the caller re-checks cross-field rules
    pub fn apply_patch(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(discount_price) = patch.discount_price {
            self.discount_price = discount_price;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(subcategory) = patch.subcategory {
            self.subcategory = subcategory;
        }
        if let Some(brand) = patch.brand {
            self.brand = brand;
        }
        if let Some(sizes) = patch.sizes {
            self.sizes = sizes;
        }
        if let Some(colors) = patch.colors {
            self.colors = colors;
        }
        if let Some(images) = patch.images {
            self.images = images;
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
        if let Some(is_featured) = patch.is_featured {
            self.is_featured = is_featured;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(specifications) = patch.specifications {
            self.specifications = specifications;
        }
        self.updated_at = Utc::now();
    }

    /// Invariants that span several fields
    pub fn check_invariants(&self) -> Result<(), ValidationError> {
        check_discount(self.price, self.discount_price)?;
        unique_sizes(&self.sizes)
    }
}

/// Product with derived values, as served to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub in_stock: bool,
    pub final_price: f64,
    pub main_image: Option<String>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            in_stock: product.in_stock(),
            final_price: product.final_price(),
            main_image: product.main_image().map(str::to_string),
            product,
        }
    }
}

fn check_discount(price: f64, discount_price: Option<f64>) -> Result<(), ValidationError> {
    match discount_price {
        Some(discount) if discount < 0.0 => Err(ValidationError::new("discount_price")
            .with_message("Discount price cannot be negative".into())),
        Some(discount) if discount >= price => Err(ValidationError::new("discount_price")
            .with_message("Discount price must be less than regular price".into())),
        _ => Ok(()),
    }
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("Name cannot be blank".into()));
    }
    Ok(())
}

fn unique_sizes(sizes: &[SizeStock]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    if sizes.iter().all(|s| seen.insert(s.size)) {
        Ok(())
    } else {
        Err(ValidationError::new("unique_sizes").with_message("Sizes must be unique".into()))
    }
}

fn validate_sizes(sizes: &[SizeStock]) -> Result<(), ValidationError> {
    unique_sizes(sizes)
}

fn validate_input(input: &ProductInput) -> Result<(), ValidationError> {
    check_discount(input.price, input.discount_price)
}

/// Payload for creating a product
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_input"))]
pub struct ProductInput {
    #[validate(
        length(max = 100, message = "Product name cannot be more than 100 characters"),
        custom(function = "non_blank")
    )]
    pub name: String,
    #[validate(length(min = 1, max = 1000, message = "Description cannot be more than 1000 characters"))]
    pub description: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    #[validate(range(min = 0.0))]
    pub discount_price: Option<f64>,
    pub category: Category,
    #[validate(length(min = 1))]
    pub subcategory: String,
    #[validate(length(min = 1))]
    pub brand: String,
    #[serde(default)]
    #[validate(custom(function = "validate_sizes"))]
    pub sizes: Vec<SizeStock>,
    #[serde(default)]
    #[validate(nested)]
    pub colors: Vec<Color>,
    #[serde(default)]
    #[validate(nested)]
    pub images: Vec<ProductImage>,
    #[validate(range(min = 1.0, max = 5.0))]
    pub rating: Option<f64>,
    pub is_featured: Option<bool>,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub specifications: Option<Specifications>,
}

/// Payload for updating a product; absent fields are left untouched
///
/// `discountPrice: null` clears the discount.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[validate(length(max = 100), custom(function = "non_blank"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 1000))]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "double_option")]
    pub discount_price: Option<Option<f64>>,
    pub category: Option<Category>,
    #[validate(length(min = 1))]
    pub subcategory: Option<String>,
    #[validate(length(min = 1))]
    pub brand: Option<String>,
    #[validate(custom(function = "validate_sizes"))]
    pub sizes: Option<Vec<SizeStock>>,
    #[validate(nested)]
    pub colors: Option<Vec<Color>>,
    #[validate(nested)]
    pub images: Option<Vec<ProductImage>>,
    #[validate(range(min = 1.0, max = 5.0))]
    pub rating: Option<f64>,
    pub is_featured: Option<bool>,
    pub is_active: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub specifications: Option<Specifications>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

/// Query parameters for listing products
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub category: Option<Category>,
    pub featured: Option<bool>,
    /// Include inactive products (admins only)
    #[serde(default)]
    pub include_inactive: bool,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        (self.include_inactive || product.is_active)
            && self.category.is_none_or(|c| product.category == c)
            && self.featured.is_none_or(|f| product.is_featured == f)
    }
}
