//! Database query functions (Data Access Objects).
//!
//! Composite reads that stitch related rows together. Each function issues a
//! fixed number of calls regardless of how many rows come back: parents
//! first, then every child for those parents in one `in (...)` lookup.

use std::collections::HashMap;

use adapters::{
    models::{Food, FoodImage, FoodPlace, PlaceImage},
    AdapterError, Database,
};

use super::models::{FoodRef, FoodWithImages, PlaceDetail, ReviewAuthor, ReviewWithAuthor};

fn group_by<T, K, F>(items: Vec<T>, key: F) -> HashMap<K, Vec<T>>
where
    K: std::hash::Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut groups: HashMap<K, Vec<T>> = HashMap::new();
    for item in items {
        groups.entry(key(&item)).or_default().push(item);
    }
    groups
}

pub async fn foods_with_images(db: &dyn Database) -> Result<Vec<FoodWithImages>, AdapterError> {
    let foods = db.list_foods().await?;
    let mut images = group_by(db.list_food_images().await?, |image: &FoodImage| image.id_food);

    Ok(foods
        .into_iter()
        .map(|food| FoodWithImages {
            images: images.remove(&food.id_food).unwrap_or_default(),
            food,
        })
        .collect())
}

pub async fn attach_images(
    db: &dyn Database,
    food: Food,
) -> Result<FoodWithImages, AdapterError> {
    let images = db.food_images(food.id_food).await?;
    Ok(FoodWithImages { food, images })
}

pub async fn food_with_images(
    db: &dyn Database,
    id: i64,
) -> Result<Option<FoodWithImages>, AdapterError> {
    match db.get_food(id).await? {
        Some(food) => Ok(Some(attach_images(db, food).await?)),
        None => Ok(None),
    }
}

pub async fn food_by_exact_name(
    db: &dyn Database,
    name: &str,
) -> Result<Option<FoodWithImages>, AdapterError> {
    match db.find_food_by_name(name).await? {
        Some(food) => Ok(Some(attach_images(db, food).await?)),
        None => Ok(None),
    }
}

/// Embeds the sold food's name and the place images into each place,
/// preserving the order of `places`.
pub async fn place_details(
    db: &dyn Database,
    places: Vec<FoodPlace>,
) -> Result<Vec<PlaceDetail>, AdapterError> {
    if places.is_empty() {
        return Ok(Vec::new());
    }

    let place_ids: Vec<i64> = places.iter().map(|p| p.id).collect();
    let mut food_ids: Vec<i64> = places.iter().filter_map(|p| p.food_id).collect();
    food_ids.sort_unstable();
    food_ids.dedup();

    let mut images = group_by(db.place_images(&place_ids).await?, |image: &PlaceImage| {
        image.id_food_place
    });
    let food_names: HashMap<i64, String> = db
        .foods_by_ids(&food_ids)
        .await?
        .into_iter()
        .map(|food| (food.id_food, food.food_name))
        .collect();

    Ok(places
        .into_iter()
        .map(|place| PlaceDetail {
            food: place
                .food_id
                .and_then(|id| food_names.get(&id))
                .map(|food_name| FoodRef {
                    food_name: food_name.clone(),
                }),
            images: images.remove(&place.id).unwrap_or_default(),
            place,
        })
        .collect())
}

pub async fn all_place_details(db: &dyn Database) -> Result<Vec<PlaceDetail>, AdapterError> {
    let places = db.list_places().await?;
    place_details(db, places).await
}

pub async fn place_detail(
    db: &dyn Database,
    id: i64,
) -> Result<Option<PlaceDetail>, AdapterError> {
    let Some(place) = db.get_place(id).await? else {
        return Ok(None);
    };
    Ok(place_details(db, vec![place]).await?.pop())
}

pub async fn reviews_with_authors(
    db: &dyn Database,
    id_food: i64,
) -> Result<Vec<ReviewWithAuthor>, AdapterError> {
    let reviews = db.reviews_for_food(id_food).await?;
    if reviews.is_empty() {
        return Ok(Vec::new());
    }

    let mut user_ids: Vec<i64> = reviews.iter().map(|r| r.id_user).collect();
    user_ids.sort_unstable();
    user_ids.dedup();

    let authors: HashMap<i64, ReviewAuthor> = db
        .users_by_ids(&user_ids)
        .await?
        .into_iter()
        .map(|user| {
            (
                user.id,
                ReviewAuthor {
                    name: user.name,
                    email: user.email,
                },
            )
        })
        .collect();

    Ok(reviews
        .into_iter()
        .map(|review| ReviewWithAuthor {
            user: authors.get(&review.id_user).map(|author| ReviewAuthor {
                name: author.name.clone(),
                email: author.email.clone(),
            }),
            review,
        })
        .collect())
}
