//! MongoDB storage backend using the official MongoDB async driver.
//!
//! Provides [`MongoCatalog`] and [`MongoOrderLedger`] backed by a
//! `mongodb::Database`. Gated behind the `mongodb_backend` feature.
//!
//! # Storage model
//!
//! Products live in the `products` collection and orders in `orders`. Both
//! are serialized through `serde_json::Value` and converted to BSON, so
//! UUIDs and timestamps are stored as strings. The `id` field is mapped to
//! MongoDB's `_id`.
//!
//! # Stock updates
//!
//! A reservation is one `findOneAndUpdate` whose filter only matches when
//! the size element still holds enough units:
//!
//! ```text
//! { _id, sizes: { $elemMatch: { size, quantity: { $gte: n } } } }
//! { $inc: { "sizes.$.quantity": -n, sold: n } }
//! ```
//!
//! When nothing matches, the product is read once more to tell an unknown
//! product, an unknown size and insufficient stock apart.

use crate::catalog::{CatalogService, PatchOutcome, Product, ProductPatch, Size, StockUpdate};
use crate::orders::{Order, OrderLedger, PaymentUpdate, StatusChange};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection, Database, IndexModel};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;
use uuid::Uuid;

const PRODUCTS: &str = "products";
const ORDERS: &str = "orders";

/// Connect to `uri` and select `database`
pub async fn connect(uri: &str, database: &str) -> Result<Database> {
    let client = Client::with_uri_str(uri)
        .await
        .map_err(|e| anyhow!("Failed to connect to MongoDB: {}", e))?;
    info!(database, "connected to MongoDB");
    Ok(client.database(database))
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// JSON object to BSON document, with `id` stored as `_id`
fn json_to_document(json: serde_json::Value) -> Result<Document> {
    let Bson::Document(mut doc) = mongodb::bson::to_bson(&json)
        .map_err(|e| anyhow!("Failed to convert JSON to BSON: {}", e))?
    else {
        return Err(anyhow!("Expected a JSON object, got non-object"));
    };

    if let Some(id) = doc.remove("id") {
        doc.insert("_id", id);
    }

    Ok(doc)
}

fn document_to_json(mut doc: Document) -> serde_json::Value {
    if let Some(id) = doc.remove("_id") {
        doc.insert("id", id);
    }

    Bson::Document(doc).into_relaxed_extjson()
}

fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    let json = serde_json::to_value(value).map_err(|e| anyhow!("Failed to serialize: {}", e))?;
    json_to_document(json)
}

fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T> {
    serde_json::from_value(document_to_json(doc))
        .map_err(|e| anyhow!("Failed to deserialize document: {}", e))
}

/// A single value in the same representation `to_document` stores
fn json_bson<T: Serialize>(value: &T) -> Result<Bson> {
    let json = serde_json::to_value(value).map_err(|e| anyhow!("Failed to serialize: {}", e))?;
    mongodb::bson::to_bson(&json).map_err(|e| anyhow!("Failed to convert JSON to BSON: {}", e))
}

fn uuid_bson(id: &Uuid) -> Bson {
    Bson::String(id.to_string())
}

/// The `sold` counter as stored, whichever integer width the server kept
fn sold_count(doc: &Document) -> i64 {
    match doc.get("sold") {
        Some(Bson::Int64(n)) => *n,
        Some(Bson::Int32(n)) => i64::from(*n),
        _ => 0,
    }
}

async fn collect<T: DeserializeOwned>(cursor: mongodb::Cursor<Document>) -> Result<Vec<T>> {
    let docs: Vec<Document> = cursor
        .try_collect()
        .await
        .map_err(|e| anyhow!("Failed to collect documents: {}", e))?;
    docs.into_iter().map(from_document).collect()
}

// ---------------------------------------------------------------------------
// MongoCatalog
// ---------------------------------------------------------------------------

/// Product catalog backed by the `products` collection
#[derive(Clone, Debug)]
pub struct MongoCatalog {
    database: Database,
}

impl MongoCatalog {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn collection(&self) -> Collection<Document> {
        self.database.collection(PRODUCTS)
    }

    /// Explain why a conditional stock change matched nothing
    async fn diagnose(&self, id: &Uuid, size: Size) -> Result<StockUpdate> {
        let Some(product) = CatalogService::get(self, id).await? else {
            return Ok(StockUpdate::UnknownProduct);
        };
        Ok(match product.stock_for(size) {
            Some(available) => StockUpdate::Insufficient { available },
            None => StockUpdate::UnknownSize,
        })
    }

    fn remaining(doc: Document, size: Size) -> Result<StockUpdate> {
        let product: Product = from_document(doc)?;
        product
            .stock_for(size)
            .map(|remaining| StockUpdate::Applied { remaining })
            .ok_or_else(|| anyhow!("Size {} vanished during stock update", size))
    }
}

#[async_trait]
impl CatalogService for MongoCatalog {
    async fn create(&self, product: Product) -> Result<Product> {
        self.collection()
            .insert_one(to_document(&product)?)
            .await
            .map_err(|e| anyhow!("Failed to create product: {}", e))?;

        Ok(product)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Product>> {
        let doc = self
            .collection()
            .find_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| anyhow!("Failed to get product: {}", e))?;

        doc.map(from_document).transpose()
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let cursor = self
            .collection()
            .find(doc! {})
            .await
            .map_err(|e| anyhow!("Failed to list products: {}", e))?;

        collect(cursor).await
    }

    /// `$set` the patched fields, leaving `sold` and, unless the patch
    /// replaces them, `sizes` to concurrent stock updates
    async fn update(&self, id: &Uuid, patch: ProductPatch) -> Result<PatchOutcome> {
        let Some(mut product) = CatalogService::get(self, id).await? else {
            return Ok(PatchOutcome::NotFound);
        };

        let replaces_sizes = patch.sizes.is_some();
        product.apply_patch(patch);
        if let Err(err) = product.check_invariants() {
            return Ok(PatchOutcome::Rejected(err));
        }

        let mut fields = to_document(&product)?;
        fields.remove("_id");
        fields.remove("sold");
        fields.remove("createdAt");
        if !replaces_sizes {
            fields.remove("sizes");
        }

        let mut update = doc! { "$set": fields };
        if product.discount_price.is_none() {
            update.insert("$unset", doc! { "discountPrice": "" });
        }

        let updated = self
            .collection()
            .find_one_and_update(doc! { "_id": uuid_bson(id) }, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| anyhow!("Failed to update product: {}", e))?;

        match updated {
            Some(doc) => Ok(PatchOutcome::Updated(from_document(doc)?)),
            None => Ok(PatchOutcome::NotFound),
        }
    }

    async fn delete(&self, id: &Uuid) -> Result<bool> {
        let result = self
            .collection()
            .delete_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| anyhow!("Failed to delete product: {}", e))?;

        Ok(result.deleted_count > 0)
    }

    async fn try_decrement(&self, id: &Uuid, size: Size, quantity: u32) -> Result<StockUpdate> {
        let n = i64::from(quantity);
        let filter = doc! {
            "_id": uuid_bson(id),
            "sizes": { "$elemMatch": { "size": size.as_str(), "quantity": { "$gte": n } } },
        };
        let update = doc! { "$inc": { "sizes.$.quantity": -n, "sold": n } };

        let updated = self
            .collection()
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| anyhow!("Failed to reserve stock: {}", e))?;

        match updated {
            Some(doc) => Self::remaining(doc, size),
            None => self.diagnose(id, size).await,
        }
    }

    async fn increment(&self, id: &Uuid, size: Size, quantity: u32) -> Result<StockUpdate> {
        let n = i64::from(quantity);
        let filter = doc! { "_id": uuid_bson(id), "sizes.size": size.as_str() };
        let update = doc! { "$inc": { "sizes.$.quantity": n, "sold": -n } };

        let updated = self
            .collection()
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| anyhow!("Failed to restore stock: {}", e))?;

        match updated {
            Some(mut doc) => {
                if sold_count(&doc) < 0 {
                    self.collection()
                        .update_one(
                            doc! { "_id": uuid_bson(id), "sold": { "$lt": 0 } },
                            doc! { "$set": { "sold": 0_i64 } },
                        )
                        .await
                        .map_err(|e| anyhow!("Failed to clamp sold counter: {}", e))?;
                    doc.insert("sold", 0_i64);
                }
                Self::remaining(doc, size)
            }
            None => self.diagnose(id, size).await,
        }
    }
}

// ---------------------------------------------------------------------------
// MongoOrderLedger
// ---------------------------------------------------------------------------

/// Order ledger backed by the `orders` collection
#[derive(Clone, Debug)]
pub struct MongoOrderLedger {
    database: Database,
}

impl MongoOrderLedger {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn collection(&self) -> Collection<Document> {
        self.database.collection(ORDERS)
    }

    /// Index the owner lookup used by `list_by_user`. Idempotent.
    pub async fn ensure_indexes(&self) -> Result<()> {
        let indexes = vec![IndexModel::builder().keys(doc! { "user": 1 }).build()];

        self.collection()
            .create_indexes(indexes)
            .await
            .map_err(|e| anyhow!("Failed to create indexes on orders collection: {}", e))?;

        Ok(())
    }

    async fn find_newest_first(&self, filter: Document) -> Result<Vec<Order>> {
        let cursor = self
            .collection()
            .find(filter)
            .await
            .map_err(|e| anyhow!("Failed to list orders: {}", e))?;

        let mut orders: Vec<Order> = collect(cursor).await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}

#[async_trait]
impl OrderLedger for MongoOrderLedger {
    async fn append(&self, order: Order) -> Result<Order> {
        self.collection()
            .insert_one(to_document(&order)?)
            .await
            .map_err(|e| anyhow!("Failed to append order: {}", e))?;

        Ok(order)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Order>> {
        let doc = self
            .collection()
            .find_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| anyhow!("Failed to get order: {}", e))?;

        doc.map(from_document).transpose()
    }

    /// `$set` the new status, filtered on the status the caller read
    async fn transition(&self, id: &Uuid, change: &StatusChange) -> Result<Option<Order>> {
        let filter = doc! { "_id": uuid_bson(id), "orderStatus": change.from.as_str() };
        let mut fields = doc! {
            "orderStatus": change.to.as_str(),
            "updatedAt": json_bson(&change.at)?,
        };
        if let Some(at) = change.delivered_at() {
            fields.insert("isDelivered", true);
            fields.insert("deliveredAt", json_bson(&at)?);
        }

        let updated = self
            .collection()
            .find_one_and_update(filter, doc! { "$set": fields })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| anyhow!("Failed to change order status: {}", e))?;

        updated.map(from_document).transpose()
    }

    async fn record_payment(&self, id: &Uuid, payment: &PaymentUpdate) -> Result<Option<Order>> {
        let mut set = doc! {
            "isPaid": true,
            "paidAt": json_bson(&payment.at)?,
            "paymentInfo.status": json_bson(&payment.status)?,
            "paymentInfo.paidAt": json_bson(&payment.at)?,
            "updatedAt": json_bson(&payment.at)?,
        };
        let mut unset = Document::new();
        if let Some(payment_id) = &payment.payment_id {
            set.insert("paymentInfo.id", payment_id.as_str());
        }
        for (field, value) in [
            ("paymentInfo.updateTime", &payment.update_time),
            ("paymentInfo.emailAddress", &payment.email_address),
        ] {
            match value {
                Some(value) => set.insert(field, value.as_str()),
                None => unset.insert(field, ""),
            };
        }

        let mut update = doc! { "$set": set };
        if !unset.is_empty() {
            update.insert("$unset", unset);
        }

        let updated = self
            .collection()
            .find_one_and_update(doc! { "_id": uuid_bson(id) }, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| anyhow!("Failed to record payment: {}", e))?;

        updated.map(from_document).transpose()
    }

    async fn list_by_user(&self, user: &Uuid) -> Result<Vec<Order>> {
        self.find_newest_first(doc! { "user": uuid_bson(user) }).await
    }

    async fn list_all(&self) -> Result<Vec<Order>> {
        self.find_newest_first(doc! {}).await
    }
}
