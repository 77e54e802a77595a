//! Built-in demo catalogs.
//!
//! - `simple`: two Postgres tables in `public` with short alias prefixes
//! - `multi_schema`: a Postgres warehouse split over `sales`, `crm`,
//!   `inventory` and `marketing` (the last one deliberately disconnected)
//! - `snowflake`: product analytics tables in Snowflake

use std::fmt;
use std::str::FromStr;

use super::{
    AggregationType, CatalogBuilder, CatalogResult, DataType, Dimension, Entity, Metric,
    Relationship, RelationshipKind, SemanticCatalog,
};
use crate::sql::dialect::Dialect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleCatalog {
    Simple,
    MultiSchema,
    Snowflake,
}

impl SampleCatalog {
    pub const ALL: [SampleCatalog; 3] = [
        SampleCatalog::Simple,
        SampleCatalog::MultiSchema,
        SampleCatalog::Snowflake,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SampleCatalog::Simple => "simple",
            SampleCatalog::MultiSchema => "multi_schema",
            SampleCatalog::Snowflake => "snowflake",
        }
    }

    pub fn builder(&self) -> CatalogBuilder {
        match self {
            SampleCatalog::Simple => simple(),
            SampleCatalog::MultiSchema => multi_schema(),
            SampleCatalog::Snowflake => snowflake(),
        }
    }

    pub fn build(&self) -> CatalogResult<SemanticCatalog> {
        self.builder().build()
    }
}

impl fmt::Display for SampleCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sample catalog '{0}' (expected one of: simple, multi_schema, snowflake)")]
pub struct UnknownSample(pub String);

impl FromStr for SampleCatalog {
    type Err = UnknownSample;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "simple" => Ok(SampleCatalog::Simple),
            "multi_schema" | "multischema" => Ok(SampleCatalog::MultiSchema),
            "snowflake" => Ok(SampleCatalog::Snowflake),
            _ => Err(UnknownSample(s.to_string())),
        }
    }
}

fn simple() -> CatalogBuilder {
    let users = Entity::new("users", "public", "users")
        .with_description("Users/Customers")
        .with_alias_prefix("u")
        .with_primary_key("id")
        .with_dimension(
            Dimension::new("user_id", "users", "id", DataType::Number).with_description("User ID"),
        )
        .with_dimension(
            Dimension::new("country", "users", "country_code", DataType::String)
                .with_description("Country"),
        )
        .with_dimension(
            Dimension::new("registration_date", "users", "created_at", DataType::Date)
                .with_description("Registration date")
                .with_expression("DATE(created_at)"),
        )
        .with_metric(
            Metric::new("user_count", "users", AggregationType::Count, "id")
                .with_description("User count"),
        );

    let orders = Entity::new("orders", "public", "orders")
        .with_description("Customer orders")
        .with_alias_prefix("o")
        .with_primary_key("id")
        .with_dimension(
            Dimension::new("order_id", "orders", "id", DataType::Number).with_description("Order ID"),
        )
        .with_dimension(
            Dimension::new("order_date", "orders", "created_at", DataType::Date)
                .with_description("Order date")
                .with_expression("DATE(created_at)"),
        )
        .with_dimension(
            Dimension::new("product_category", "orders", "category", DataType::String)
                .with_description("Product category"),
        )
        .with_metric(
            Metric::new("revenue", "orders", AggregationType::Sum, "amount")
                .with_description("Revenue")
                .with_time_dimension("order_date")
                .with_format("currency"),
        )
        .with_metric(
            Metric::new("net_profit", "orders", AggregationType::Sum, "amount - cost")
                .with_description("Net profit")
                .with_time_dimension("order_date")
                .with_format("currency"),
        )
        .with_metric(
            Metric::new("order_count", "orders", AggregationType::Count, "id")
                .with_description("Order count")
                .with_time_dimension("order_date"),
        )
        .with_relationship(
            Relationship::new("orders_to_users", "orders", "users", RelationshipKind::ManyToOne)
                .on("user_id", "id"),
        );

    CatalogBuilder::new().entity(users).entity(orders)
}

fn multi_schema() -> CatalogBuilder {
    let orders = Entity::new("orders", "sales", "orders")
        .with_description("Customer orders")
        .with_database("warehouse")
        .with_primary_key("id")
        .with_dimension(Dimension::new("order_id", "orders", "id", DataType::Number))
        .with_dimension(
            Dimension::new("order_date", "orders", "created_at", DataType::Date)
                .with_description("Date the order was placed")
                .with_expression("DATE(created_at)"),
        )
        .with_dimension(
            Dimension::new("status", "orders", "order_status", DataType::String)
                .with_description("Fulfilment status"),
        )
        .with_dimension(Dimension::new(
            "product_category",
            "orders",
            "category",
            DataType::String,
        ))
        .with_metric(
            Metric::new("revenue", "orders", AggregationType::Sum, "amount_usd")
                .with_description("Gross revenue in USD")
                .with_time_dimension("order_date")
                .with_format("currency"),
        )
        .with_metric(
            Metric::new("order_count", "orders", AggregationType::Count, "id")
                .with_time_dimension("order_date"),
        )
        .with_metric(
            Metric::new("average_order_value", "orders", AggregationType::Avg, "amount_usd")
                .with_time_dimension("order_date")
                .with_format("currency"),
        )
        .with_metric(
            Metric::new(
                "unique_customers",
                "orders",
                AggregationType::CountDistinct,
                "customer_id",
            )
            .with_time_dimension("order_date"),
        )
        .with_metric(
            Metric::new(
                "discounted_revenue",
                "orders",
                AggregationType::Sum,
                "amount_usd * (1 - {crm.customers.discount_rate})",
            )
            .with_description("Revenue after customer discounts")
            .with_time_dimension("order_date")
            .with_format("currency"),
        )
        .with_relationship(
            Relationship::new(
                "orders_to_customers",
                "orders",
                "customers",
                RelationshipKind::ManyToOne,
            )
            .on("customer_id", "id"),
        );

    let customers = Entity::new("customers", "crm", "customers")
        .with_description("Customer master data")
        .with_database("warehouse")
        .with_primary_key("id")
        .with_dimension(Dimension::new("customer_id", "customers", "id", DataType::Number))
        .with_dimension(
            Dimension::new("country", "customers", "country_code", DataType::String)
                .with_description("ISO country code"),
        )
        .with_dimension(Dimension::new(
            "customer_segment",
            "customers",
            "segment",
            DataType::String,
        ))
        .with_dimension(Dimension::new(
            "is_active",
            "customers",
            "is_active",
            DataType::Boolean,
        ))
        .with_dimension(
            Dimension::new("signup_date", "customers", "created_at", DataType::Date)
                .with_expression("DATE(created_at)"),
        )
        .with_metric(
            Metric::new("customer_count", "customers", AggregationType::Count, "id")
                .with_time_dimension("signup_date"),
        );

    let order_items = Entity::new("order_items", "sales", "order_items")
        .with_description("Order line items")
        .with_database("warehouse")
        .with_primary_key("id")
        .with_dimension(Dimension::new(
            "line_quantity",
            "order_items",
            "quantity",
            DataType::Number,
        ))
        .with_metric(
            Metric::new("units_sold", "order_items", AggregationType::Sum, "quantity")
                .with_description("Units sold across all line items"),
        )
        .with_relationship(
            Relationship::new(
                "items_to_orders",
                "order_items",
                "orders",
                RelationshipKind::ManyToOne,
            )
            .on("order_id", "id"),
        )
        .with_relationship(
            Relationship::new(
                "items_to_products",
                "order_items",
                "products",
                RelationshipKind::ManyToOne,
            )
            .on("product_id", "inventory.products.id"),
        );

    let products = Entity::new("products", "inventory", "products")
        .with_description("Product catalogue")
        .with_database("warehouse")
        .with_primary_key("id")
        .with_dimension(Dimension::new("product_name", "products", "name", DataType::String))
        .with_dimension(Dimension::new("brand", "products", "brand", DataType::String))
        .with_metric(Metric::new("product_count", "products", AggregationType::Count, "id"));

    let campaigns = Entity::new("campaigns", "marketing", "campaigns")
        .with_description("Marketing campaigns (not linked to sales)")
        .with_database("warehouse")
        .with_primary_key("id")
        .with_dimension(Dimension::new("channel", "campaigns", "channel", DataType::String))
        .with_dimension(Dimension::new(
            "campaign_start",
            "campaigns",
            "start_date",
            DataType::Date,
        ))
        .with_metric(
            Metric::new("campaign_spend", "campaigns", AggregationType::Sum, "budget_usd")
                .with_time_dimension("campaign_start")
                .with_format("currency"),
        );

    CatalogBuilder::new()
        .entity(orders)
        .entity(customers)
        .entity(order_items)
        .entity(products)
        .entity(campaigns)
}

fn snowflake() -> CatalogBuilder {
    let events = Entity::new("events", "analytics", "events")
        .with_description("Product usage events")
        .with_database("PROD")
        .with_dialect(Dialect::Snowflake)
        .with_dimension(Dimension::new("event_type", "events", "event_type", DataType::String))
        .with_dimension(
            Dimension::new("event_date", "events", "occurred_at", DataType::Datetime)
                .with_expression("TO_DATE(occurred_at)"),
        )
        .with_metric(
            Metric::new("event_count", "events", AggregationType::Count, "*")
                .with_time_dimension("event_date"),
        )
        .with_metric(
            Metric::new("active_accounts", "events", AggregationType::CountDistinct, "account_id")
                .with_time_dimension("event_date"),
        )
        .with_relationship(
            Relationship::new("events_to_accounts", "events", "accounts", RelationshipKind::ManyToOne)
                .on("account_id", "id"),
        );

    let accounts = Entity::new("accounts", "analytics", "accounts")
        .with_database("PROD")
        .with_dialect(Dialect::Snowflake)
        .with_primary_key("id")
        .with_dimension(Dimension::new("plan_tier", "accounts", "plan", DataType::String))
        .with_dimension(Dimension::new("region", "accounts", "region", DataType::String))
        .with_metric(Metric::new("account_count", "accounts", AggregationType::Count, "id"));

    let invoices = Entity::new("invoices", "billing", "invoices")
        .with_database("PROD")
        .with_dialect(Dialect::Snowflake)
        .with_dimension(
            Dimension::new("invoice_month", "invoices", "issued_at", DataType::Date)
                .with_expression("DATE_TRUNC('month', issued_at)"),
        )
        .with_metric(
            Metric::new("billed_amount", "invoices", AggregationType::Sum, "amount")
                .with_time_dimension("invoice_month")
                .with_format("currency"),
        )
        .with_relationship(
            Relationship::new(
                "invoices_to_accounts",
                "invoices",
                "accounts",
                RelationshipKind::ManyToOne,
            )
            .on("account_id", "id"),
        );

    CatalogBuilder::new()
        .entity(events)
        .entity(accounts)
        .entity(invoices)
}
