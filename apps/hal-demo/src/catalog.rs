//! In-memory order catalog rendered by the demo commands and routes.

use std::cmp::Ordering;

use halkit::{
    Embed, EmbeddedProperty, EntityId, EntityKind, LinkDeclaration, Meta, MetaContributor,
    PageParams, PagedEntities, SortParam,
};
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl EntityKind for Customer {
    const TYPE_NAME: &'static str = "Customer";
    const LINKS: &'static [LinkDeclaration] = &[LinkDeclaration::new("orders", "Orders")];

    fn id(&self) -> EntityId {
        self.id.into()
    }
}

impl MetaContributor for Customer {}

#[derive(Clone, Debug, Serialize)]
pub struct LineItem {
    pub id: i64,
    pub sku: String,
    pub quantity: u32,
    pub unit_price_cents: u64,
}

impl EntityKind for LineItem {
    const TYPE_NAME: &'static str = "LineItem";

    fn id(&self) -> EntityId {
        self.id.into()
    }
}

impl MetaContributor for LineItem {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
}

/// Related records are rendered under `_embedded`, not inline.
#[derive(Clone, Debug, Serialize)]
pub struct Order {
    pub id: i64,
    pub status: OrderStatus,
    pub total_cents: u64,
    #[serde(skip)]
    pub customer: Option<Customer>,
    #[serde(skip)]
    pub items: Vec<LineItem>,
}

fn order_customer(o: &Order) -> Option<Embed<'_>> {
    Embed::optional(o.customer.as_ref())
}

fn order_items(o: &Order) -> Option<Embed<'_>> {
    Some(Embed::many(&o.items))
}

impl EntityKind for Order {
    const TYPE_NAME: &'static str = "Order";
    const LINKS: &'static [LinkDeclaration] = &[LinkDeclaration::new("customer", "Customers")];

    fn id(&self) -> EntityId {
        self.id.into()
    }

    fn embedded_properties() -> &'static [EmbeddedProperty<Self>] {
        const PROPS: &[EmbeddedProperty<Order>] = &[
            EmbeddedProperty::new("Customer", order_customer),
            EmbeddedProperty::new("Items", order_items),
        ];
        PROPS
    }
}

impl MetaContributor for Order {
    fn populate_meta(&self, meta: &mut Meta) {
        meta.insert("item_count".to_string(), self.items.len().into());
    }
}

/// Field names accepted by `Sort`.
pub const SORT_FIELDS: &[&str] = &["id", "status", "total", "customer"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort field {0:?}, expected one of: id, status, total, customer")]
pub struct UnknownSortField(pub String);

fn compare(field: &str, a: &Order, b: &Order) -> Ordering {
    let customer = |o: &Order| o.customer.as_ref().map(|c| c.id);
    match field {
        "status" => a.status.cmp(&b.status),
        "total" => a.total_cents.cmp(&b.total_cents),
        "customer" => customer(a).cmp(&customer(b)),
        _ => a.id.cmp(&b.id),
    }
}

const CUSTOMERS: &[(&str, &str)] = &[
    ("Ada Lovelace", "ada@example.com"),
    ("Grace Hopper", "grace@example.com"),
    ("Alan Turing", "alan@example.com"),
    ("Edsger Dijkstra", "edsger@example.com"),
    ("Barbara Liskov", "barbara@example.com"),
];

#[derive(Clone, Debug)]
pub struct Catalog {
    customers: Vec<Customer>,
    orders: Vec<Order>,
}

impl Catalog {
    /// Deterministic catalog of `total` orders with ids `1..=total`.
    pub fn generate(total: usize) -> Self {
        let customers: Vec<Customer> = CUSTOMERS
            .iter()
            .zip(1..)
            .map(|((name, email), id)| Customer {
                id,
                name: name.to_string(),
                email: email.to_string(),
            })
            .collect();

        let orders = (0..total)
            .map(|i| {
                let items: Vec<LineItem> = (0..(i % 3) + 1)
                    .map(|j| LineItem {
                        id: (i * 10 + j + 1) as i64,
                        sku: format!("SKU-{:03}", (i + j) % 40),
                        quantity: (j + 1) as u32,
                        unit_price_cents: 250 * (1 + ((i + j) % 7) as u64),
                    })
                    .collect();
                let status = match i % 3 {
                    0 => OrderStatus::Pending,
                    1 => OrderStatus::Shipped,
                    _ => OrderStatus::Delivered,
                };
                Order {
                    id: (i + 1) as i64,
                    status,
                    total_cents: items
                        .iter()
                        .map(|it| u64::from(it.quantity) * it.unit_price_cents)
                        .sum(),
                    customer: customers.get(i % customers.len()).cloned(),
                    items,
                }
            })
            .collect();

        Self { customers, orders }
    }

    pub fn order(&self, id: i64) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn customer(&self, id: i64) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    /// One page of orders, optionally restricted to a customer, ordered by
    /// `params.sort` (earlier keys take precedence).
    pub fn page(
        &self,
        params: &PageParams,
        customer_id: Option<i64>,
    ) -> Result<PagedEntities<Order>, UnknownSortField> {
        if let Some(unknown) = params
            .sort
            .iter()
            .find(|s| !SORT_FIELDS.contains(&s.field.as_str()))
        {
            return Err(UnknownSortField(unknown.field.clone()));
        }

        let mut selected: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| {
                customer_id.is_none() || o.customer.as_ref().map(|c| c.id) == customer_id
            })
            .cloned()
            .collect();
        selected.sort_by(|a, b| compare_by(&params.sort, a, b));

        Ok(PagedEntities::from_slice(&selected, params.clone()))
    }
}

fn compare_by(sort: &[SortParam], a: &Order, b: &Order) -> Ordering {
    sort.iter()
        .map(|s| {
            let ord = compare(&s.field, a, b);
            if s.desc {
                ord.reverse()
            } else {
                ord
            }
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}
