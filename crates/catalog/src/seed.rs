//! The seed catalog the service ships with.

use common::{Money, ProductId};

use crate::error::Result;
use crate::product::NewProduct;
use crate::store::CatalogStore;

fn product(
    id: &str,
    name: &str,
    price_cents: i64,
    description: &str,
    category: &str,
    unit: &str,
    stock: u32,
) -> NewProduct {
    NewProduct {
        id: Some(ProductId::new(id)),
        name: name.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        unit: unit.to_string(),
        price: Money::from_cents(price_cents),
        stock,
    }
}

/// Returns the stock produce catalog.
pub fn seed_products() -> Vec<NewProduct> {
    vec![
        product(
            "1",
            "Fresh Red Tomatoes",
            299,
            "Vine-ripened, juicy red tomatoes perfect for salads and cooking. Locally sourced from organic farms.",
            "Vegetables",
            "kg",
            500,
        ),
        product(
            "2",
            "Premium Russet Potatoes",
            199,
            "High-quality russet potatoes, perfect for baking, mashing, or frying. Clean and ready to cook.",
            "Vegetables",
            "kg",
            1000,
        ),
        product(
            "3",
            "Sweet Yellow Onions",
            149,
            "Fresh, crisp yellow onions with a mild, sweet flavor. Essential for everyday cooking.",
            "Vegetables",
            "kg",
            750,
        ),
        product(
            "4",
            "Organic Carrots",
            249,
            "Sweet and crunchy organic carrots. Rich in vitamins and perfect for snacking or cooking.",
            "Vegetables",
            "kg",
            800,
        ),
        product(
            "5",
            "Fresh Spinach",
            399,
            "Organic baby spinach leaves, perfect for salads and cooking. Rich in iron and vitamins.",
            "Vegetables",
            "kg",
            300,
        ),
        product(
            "6",
            "Red Apples",
            499,
            "Sweet and crispy red apples. Perfect for snacking or baking.",
            "Fruits",
            "kg",
            400,
        ),
        product(
            "7",
            "Ripe Bananas",
            299,
            "Fresh yellow bananas. Rich in potassium and perfect for smoothies.",
            "Fruits",
            "kg",
            600,
        ),
        product(
            "8",
            "Sweet Oranges",
            399,
            "Juicy oranges packed with vitamin C. Great for juicing or eating fresh.",
            "Fruits",
            "kg",
            450,
        ),
        product(
            "9",
            "Fresh Strawberries",
            599,
            "Sweet and juicy strawberries. Perfect for desserts or fresh eating.",
            "Fruits",
            "kg",
            200,
        ),
        product(
            "10",
            "Organic Herbs Mix",
            499,
            "Fresh mixed herbs including basil, parsley, and cilantro. Perfect for cooking.",
            "Herbs",
            "bunch",
            150,
        ),
    ]
}

/// Loads the seed catalog into an empty store.
pub async fn seed_catalog<C: CatalogStore>(store: &C) -> Result<()> {
    for new in seed_products() {
        store.create(new).await?;
    }
    tracing::info!("seed catalog loaded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryCatalogStore;

    #[tokio::test]
    async fn seeds_ten_products_in_order() {
        let store = InMemoryCatalogStore::new();
        seed_catalog(&store).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 10);
        assert_eq!(listed[0].name, "Fresh Red Tomatoes");
        assert_eq!(listed[0].price.cents(), 299);
        assert_eq!(listed[0].stock, 500);
        assert_eq!(listed[9].unit, "bunch");
    }

    #[tokio::test]
    async fn seeding_twice_conflicts() {
        let store = InMemoryCatalogStore::new();
        seed_catalog(&store).await.unwrap();
        assert!(seed_catalog(&store).await.is_err());
    }
}
