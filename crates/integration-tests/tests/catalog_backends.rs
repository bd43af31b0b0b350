//! Adapter behavior that must be identical on both backing stores.
//!
//! Every scenario runs twice: against local storage in a temp directory and
//! against the in-process mock backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use eclat_catalog::CatalogContext;
use eclat_core::{
    Brand, BrandId, NewBrand, NewContactInfo, NewProduct, NewUtilityCategory, Price, ProductId,
    UserId, resolve_name,
};

fn product(name: &str, price: i64, brand_id: Option<&BrandId>) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: None,
        price: Price::from_minor_units(price).unwrap(),
        image_url: None,
        category_id: None,
        brand_id: brand_id.cloned(),
    }
}

async fn create_then_get_returns_payload(catalog: &CatalogContext) {
    let brand = catalog
        .brands()
        .create(NewBrand { name: "Extra Clean".to_string() })
        .await
        .unwrap();
    assert!(!brand.id.as_str().is_empty());
    assert_eq!(catalog.brands().get_by_id(&brand.id).await.unwrap(), Some(brand));

    let category = catalog
        .categories()
        .create(NewUtilityCategory {
            name: "Vitres".to_string(),
            color: "#3b82f6".to_string(),
        })
        .await
        .unwrap();
    let fetched = catalog.categories().get_by_id(&category.id).await.unwrap().unwrap();
    assert_eq!(fetched.color, "#3b82f6");

    let created = catalog
        .products()
        .create(product("Nettoyant Vitres", 1350, None))
        .await
        .unwrap();
    let fetched = catalog.products().get_by_id(&created.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Nettoyant Vitres");
    assert_eq!(fetched.price.minor_units(), 1350);

    let contact = catalog
        .contact()
        .save(NewContactInfo {
            phone: Some("+213 21 55 12 34".to_string()),
            ..NewContactInfo::default()
        })
        .await
        .unwrap();
    assert_eq!(catalog.contact().get().await.unwrap(), Some(contact));
}

async fn delete_then_get_returns_none(catalog: &CatalogContext) {
    let brand = catalog
        .brands()
        .create(NewBrand { name: "Javel Plus".to_string() })
        .await
        .unwrap();
    catalog.brands().delete(&brand.id).await.unwrap();
    assert_eq!(catalog.brands().get_by_id(&brand.id).await.unwrap(), None);

    let err = catalog.brands().delete(&brand.id).await.unwrap_err();
    assert!(err.is_not_found());
}

async fn list_is_sorted_by_name(catalog: &CatalogContext) {
    for name in ["Sols", "Cuisine", "Vitres", "Salle de bain"] {
        catalog
            .brands()
            .create(NewBrand { name: name.to_string() })
            .await
            .unwrap();
    }

    let names: Vec<String> = catalog
        .brands()
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.name)
        .collect();
    assert_eq!(names, ["Cuisine", "Salle de bain", "Sols", "Vitres"]);
}

async fn update_replaces_record(catalog: &CatalogContext) {
    let brand = catalog
        .brands()
        .create(NewBrand { name: "Extra Clean".to_string() })
        .await
        .unwrap();
    let renamed = catalog
        .brands()
        .update(Brand {
            id: brand.id.clone(),
            name: "Extra Clean Pro".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(renamed.name, "Extra Clean Pro");

    let err = catalog
        .brands()
        .update(Brand {
            id: BrandId::new("missing"),
            name: "Fantôme".to_string(),
        })
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

async fn toggle_twice_restores_membership(catalog: &CatalogContext) {
    let favorites = catalog.favorites();
    let user = UserId::new("client-42");
    let product = ProductId::new("p-1");

    assert!(favorites.toggle(&product, &user).await.unwrap());
    assert!(favorites.list(&user).await.unwrap().contains(&product));
    assert!(!favorites.toggle(&product, &user).await.unwrap());
    assert!(favorites.list(&user).await.unwrap().is_empty());

    // add is idempotent, remove of a missing pair is a no-op
    favorites.add(&product, &user).await.unwrap();
    favorites.add(&product, &user).await.unwrap();
    assert_eq!(favorites.list(&user).await.unwrap().len(), 1);
    favorites.remove(&product, &user).await.unwrap();
    favorites.remove(&product, &user).await.unwrap();
    assert!(favorites.list(&user).await.unwrap().is_empty());
}

async fn brand_delete_leaves_dangling_reference(catalog: &CatalogContext) {
    let brand = catalog
        .brands()
        .create(NewBrand { name: "Extra Clean".to_string() })
        .await
        .unwrap();
    catalog
        .products()
        .create(product("Nettoyant Vitres", 1350, Some(&brand.id)))
        .await
        .unwrap();

    let products = catalog.products().list().await.unwrap();
    let brands = catalog.brands().list().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(
        resolve_name(&brands, products[0].brand_id.as_ref()),
        Some("Extra Clean")
    );

    catalog.brands().delete(&brand.id).await.unwrap();

    let after = catalog.products().list().await.unwrap();
    let brands = catalog.brands().list().await.unwrap();
    assert_eq!(after, products);
    assert_eq!(after[0].brand_id.as_ref(), Some(&brand.id));
    assert_eq!(resolve_name(&brands, after[0].brand_id.as_ref()), None);
}

async fn query_filters_and_sorts(catalog: &CatalogContext) {
    let brand = catalog
        .brands()
        .create(NewBrand { name: "Extra Clean".to_string() })
        .await
        .unwrap();
    let products = catalog.products();
    products
        .create(product("Nettoyant Vitres", 1350, Some(&brand.id)))
        .await
        .unwrap();
    products
        .create(product("Savon Noir", 450, Some(&brand.id)))
        .await
        .unwrap();
    products.create(product("Javel", 200, None)).await.unwrap();

    let query = eclat_catalog::ProductQuery {
        brand_id: Some(brand.id.clone()),
        sort: eclat_catalog::ProductSort::PriceAsc,
        ..eclat_catalog::ProductQuery::default()
    };
    let names: Vec<String> = products
        .query(&query)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, ["Savon Noir", "Nettoyant Vitres"]);

    let query = eclat_catalog::ProductQuery {
        search: Some("vitres".to_string()),
        ..eclat_catalog::ProductQuery::default()
    };
    let found = products.query(&query).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Nettoyant Vitres");

    let query = eclat_catalog::ProductQuery {
        sort: eclat_catalog::ProductSort::PriceDesc,
        limit: Some(1),
        offset: Some(1),
        ..eclat_catalog::ProductQuery::default()
    };
    let page = products.query(&query).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].name, "Savon Noir");
}

async fn cache_reflects_invalidated_writes(catalog: &CatalogContext) {
    let cache = &catalog.caches().brands;
    assert!(cache.ensure_loaded().await.items.is_empty());

    catalog
        .brands()
        .create(NewBrand { name: "Extra Clean".to_string() })
        .await
        .unwrap();
    // Not invalidated yet, so the snapshot predates the write.
    assert!(cache.snapshot().items.is_empty());

    cache.invalidate();
    let snapshot = cache.ensure_loaded().await;
    assert_eq!(snapshot.items.len(), 1);
    assert_eq!(snapshot.last_error, None);
}

async fn filtered_name_query_uses_catalog_order(catalog: &CatalogContext) {
    let brand = catalog
        .brands()
        .create(NewBrand { name: "Extra Clean".to_string() })
        .await
        .unwrap();
    for name in ["Zeste Citron", "Éponge Magique", "Ajax Vitres"] {
        catalog
            .products()
            .create(product(name, 500, Some(&brand.id)))
            .await
            .unwrap();
    }

    let query = eclat_catalog::ProductQuery {
        brand_id: Some(brand.id.clone()),
        limit: Some(2),
        ..eclat_catalog::ProductQuery::default()
    };
    let names: Vec<String> = catalog
        .products()
        .query(&query)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, ["Ajax Vitres", "Éponge Magique"]);

    catalog
        .brands()
        .create(NewBrand { name: "Écolo".to_string() })
        .await
        .unwrap();
    let brands: Vec<String> = catalog
        .brands()
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.name)
        .collect();
    assert_eq!(brands, ["Écolo", "Extra Clean"]);
}

async fn concurrent_first_contact_saves_keep_one_record(catalog: &CatalogContext) {
    let contact = catalog.contact();
    let (phone, address) = tokio::join!(
        contact.save(NewContactInfo {
            phone: Some("+213 21 55 12 34".to_string()),
            ..NewContactInfo::default()
        }),
        contact.save(NewContactInfo {
            address: Some("Zone industrielle, Oran".to_string()),
            ..NewContactInfo::default()
        }),
    );
    assert_eq!(phone.unwrap().id, address.unwrap().id);
    assert_eq!(contact.entities().list().await.unwrap().len(), 1);
}

macro_rules! on_both_backends {
    ($($scenario:ident),* $(,)?) => {
        mod offline {
            $(
                #[tokio::test]
                async fn $scenario() {
                    let dir = tempfile::tempdir().unwrap();
                    let catalog = eclat_integration_tests::offline_catalog(&dir).await;
                    super::$scenario(&catalog).await;
                }
            )*
        }

        mod remote {
            use eclat_integration_tests::mock::MockBackend;

            $(
                #[tokio::test]
                async fn $scenario() {
                    let backend = MockBackend::start().await;
                    let dir = tempfile::tempdir().unwrap();
                    let catalog = eclat_integration_tests::remote_catalog(&backend, &dir).await;
                    super::$scenario(&catalog).await;
                }
            )*
        }
    };
}

on_both_backends!(
    create_then_get_returns_payload,
    delete_then_get_returns_none,
    list_is_sorted_by_name,
    update_replaces_record,
    toggle_twice_restores_membership,
    brand_delete_leaves_dangling_reference,
    query_filters_and_sorts,
    cache_reflects_invalidated_writes,
    filtered_name_query_uses_catalog_order,
    concurrent_first_contact_saves_keep_one_record,
);
