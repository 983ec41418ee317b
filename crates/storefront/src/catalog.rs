//! Placeholder catalog: restaurants, menus and promotional slides.
//!
//! Everything here is static sample content built once at startup. Lookups
//! are linear scans; the catalog holds a handful of entries.

use foodapp_core::{LineItem, MenuItemId, RestaurantId};
use rust_decimal::Decimal;

/// A restaurant with its menu.
#[derive(Debug, Clone)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub image_url: String,
    pub logo_url: String,
    pub cuisine_types: Vec<String>,
    /// Average rating out of 5.
    pub rating: f32,
    pub delivery_estimate: String,
    pub description: String,
    pub menu: Vec<MenuCategory>,
}

impl Restaurant {
    /// Comma-separated cuisine list ("Italian, Fine Dining").
    #[must_use]
    pub fn cuisine(&self) -> String {
        self.cuisine_types.join(", ")
    }

    /// Up to two uppercase initials, used when the logo fails to load.
    #[must_use]
    pub fn initials(&self) -> String {
        self.name.chars().take(2).collect::<String>().to_uppercase()
    }

    /// Iterate every item across all categories.
    pub fn items(&self) -> impl Iterator<Item = &MenuItem> {
        self.menu.iter().flat_map(|category| category.items.iter())
    }
}

/// A named group of menu items ("Appetizers").
#[derive(Debug, Clone)]
pub struct MenuCategory {
    pub name: String,
    pub items: Vec<MenuItem>,
}

/// A dish that can be added to the cart.
#[derive(Debug, Clone)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: String,
}

impl MenuItem {
    /// A cart line for one unit of this item.
    #[must_use]
    pub fn to_line_item(&self) -> LineItem {
        LineItem::new(
            self.id.clone(),
            self.name.clone(),
            self.price,
            Some(self.image_url.clone()),
        )
    }
}

/// One slide of the home-page promotions carousel.
#[derive(Debug, Clone)]
pub struct PromoSlide {
    pub id: u32,
    pub image_url: String,
    pub title: String,
    pub description: String,
    pub link: String,
}

/// All placeholder content.
#[derive(Debug, Clone)]
pub struct Catalog {
    restaurants: Vec<Restaurant>,
    slides: Vec<PromoSlide>,
}

impl Catalog {
    #[must_use]
    pub const fn new(restaurants: Vec<Restaurant>, slides: Vec<PromoSlide>) -> Self {
        Self {
            restaurants,
            slides,
        }
    }

    #[must_use]
    pub fn restaurants(&self) -> &[Restaurant] {
        &self.restaurants
    }

    #[must_use]
    pub fn slides(&self) -> &[PromoSlide] {
        &self.slides
    }

    /// Look up a restaurant by identifier.
    #[must_use]
    pub fn restaurant(&self, id: &RestaurantId) -> Option<&Restaurant> {
        self.restaurants.iter().find(|r| &r.id == id)
    }

    /// Look up a menu item and the restaurant that serves it.
    #[must_use]
    pub fn menu_item(&self, id: &MenuItemId) -> Option<(&Restaurant, &MenuItem)> {
        self.restaurants.iter().find_map(|restaurant| {
            restaurant
                .items()
                .find(|item| &item.id == id)
                .map(|item| (restaurant, item))
        })
    }

    /// Case-insensitive substring match on restaurant name or cuisine.
    ///
    /// A blank query returns every restaurant.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Restaurant> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.restaurants.iter().collect();
        }

        self.restaurants
            .iter()
            .filter(|r| {
                r.name.to_lowercase().contains(&needle)
                    || r.cuisine_types
                        .iter()
                        .any(|c| c.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// The sample cart offered to new visitors when demo mode is on.
    #[must_use]
    pub fn demo_cart_lines(&self) -> Vec<LineItem> {
        [("m1", 2), ("m3", 1), ("m5", 1)]
            .into_iter()
            .filter_map(|(id, quantity)| {
                self.menu_item(&MenuItemId::new(id))
                    .map(|(_, item)| item.to_line_item().with_quantity(quantity))
            })
            .collect()
    }

    /// The built-in sample content.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::new(placeholder_restaurants(), placeholder_slides())
    }
}

// =============================================================================
// Placeholder Data
// =============================================================================

fn placeholder_image(size: &str, background: &str, foreground: &str, text: &str) -> String {
    format!("https://via.placeholder.com/{size}/{background}/{foreground}?text={text}")
}

fn item(
    id: &str,
    name: &str,
    description: &str,
    cents: i64,
    image_text: &str,
    tint: &str,
) -> MenuItem {
    MenuItem {
        id: MenuItemId::new(id),
        name: name.to_string(),
        description: description.to_string(),
        price: Decimal::new(cents, 2),
        image_url: placeholder_image("150", tint, "000000", image_text),
    }
}

fn category(name: &str, items: Vec<MenuItem>) -> MenuCategory {
    MenuCategory {
        name: name.to_string(),
        items,
    }
}

#[allow(clippy::too_many_lines)]
fn placeholder_restaurants() -> Vec<Restaurant> {
    vec![
        Restaurant {
            id: RestaurantId::new("r1"),
            name: "The Gourmet Place".to_string(),
            image_url: placeholder_image("300x200", "FFD700", "000000", "Gourmet+Dining"),
            logo_url: placeholder_image("100", "FFD700", "000000", "GP"),
            cuisine_types: vec!["Italian".to_string(), "Fine Dining".to_string()],
            rating: 4.7,
            delivery_estimate: "30-40 min".to_string(),
            description: "Exquisite Italian dishes crafted with the finest ingredients. \
                          Perfect for a special occasion."
                .to_string(),
            menu: vec![
                category(
                    "Appetizers",
                    vec![
                        item(
                            "m1",
                            "Bruschetta Classica",
                            "Toasted bread with fresh tomatoes, garlic, basil, and olive oil.",
                            899,
                            "Bruschetta",
                            "FFC0CB",
                        ),
                        item(
                            "m2",
                            "Caprese Salad",
                            "Fresh mozzarella, tomatoes, basil, and balsamic glaze.",
                            1050,
                            "Caprese",
                            "98FB98",
                        ),
                    ],
                ),
                category(
                    "Main Courses",
                    vec![
                        item(
                            "m3",
                            "Lasagna Bolognese",
                            "Classic layered pasta with meat sauce and béchamel.",
                            1800,
                            "Lasagna",
                            "ADD8E6",
                        ),
                        item(
                            "m4",
                            "Risotto ai Funghi",
                            "Creamy risotto with porcini mushrooms.",
                            2250,
                            "Risotto",
                            "E6E6FA",
                        ),
                    ],
                ),
                category(
                    "Desserts",
                    vec![item(
                        "m5",
                        "Tiramisu",
                        "Ladyfingers dipped in coffee, layered with mascarpone cream.",
                        900,
                        "Tiramisu",
                        "FFFACD",
                    )],
                ),
            ],
        },
        Restaurant {
            id: RestaurantId::new("r2"),
            name: "Quick Bites Central".to_string(),
            image_url: placeholder_image("300x200", "87CEEB", "FFFFFF", "Fast+Food"),
            logo_url: placeholder_image("100", "87CEEB", "FFFFFF", "QB"),
            cuisine_types: vec![
                "Burgers".to_string(),
                "Fries".to_string(),
                "Fast Food".to_string(),
            ],
            rating: 4.2,
            delivery_estimate: "15-25 min".to_string(),
            description: "Smash burgers, crispy fries and thick shakes, fast.".to_string(),
            menu: vec![
                category(
                    "Burgers",
                    vec![
                        item(
                            "m6",
                            "Classic Smash Burger",
                            "Two smashed beef patties, cheddar, pickles and house sauce.",
                            1199,
                            "Burger",
                            "F4A460",
                        ),
                        item(
                            "m7",
                            "Crispy Chicken Burger",
                            "Buttermilk fried chicken, slaw and spicy mayo.",
                            1099,
                            "Chicken",
                            "FFE4B5",
                        ),
                    ],
                ),
                category(
                    "Sides",
                    vec![item(
                        "m8",
                        "Loaded Fries",
                        "Fries with cheese sauce, bacon bits and scallions.",
                        649,
                        "Fries",
                        "FFD700",
                    )],
                ),
            ],
        },
        Restaurant {
            id: RestaurantId::new("r3"),
            name: "Vegan Delights".to_string(),
            image_url: placeholder_image("300x200", "90EE90", "000000", "Vegan+Food"),
            logo_url: placeholder_image("100", "90EE90", "000000", "VD"),
            cuisine_types: vec![
                "Vegan".to_string(),
                "Healthy".to_string(),
                "Salads".to_string(),
            ],
            rating: 4.9,
            delivery_estimate: "25-35 min".to_string(),
            description: "Plant-based bowls and salads made fresh every morning.".to_string(),
            menu: vec![category(
                "Bowls",
                vec![
                    item(
                        "m9",
                        "Buddha Bowl",
                        "Quinoa, roasted chickpeas, avocado and tahini dressing.",
                        1250,
                        "Buddha+Bowl",
                        "98FB98",
                    ),
                    item(
                        "m10",
                        "Green Goddess Salad",
                        "Kale, cucumber, edamame and herb dressing.",
                        799,
                        "Salad",
                        "90EE90",
                    ),
                ],
            )],
        },
        Restaurant {
            id: RestaurantId::new("r4"),
            name: "Sushi Heaven".to_string(),
            image_url: placeholder_image("300x200", "FA8072", "FFFFFF", "Sushi+Place"),
            logo_url: placeholder_image("100", "FA8072", "FFFFFF", "SH"),
            cuisine_types: vec!["Japanese".to_string(), "Sushi".to_string()],
            rating: 4.5,
            delivery_estimate: "35-45 min".to_string(),
            description: "Hand-rolled sushi and sashimi from the day's catch.".to_string(),
            menu: vec![category(
                "Rolls",
                vec![
                    item(
                        "m11",
                        "Salmon Avocado Roll",
                        "Fresh salmon and avocado, eight pieces.",
                        1350,
                        "Salmon+Roll",
                        "FA8072",
                    ),
                    item(
                        "m12",
                        "Dragon Roll",
                        "Shrimp tempura topped with eel and avocado.",
                        1600,
                        "Dragon+Roll",
                        "FFB6C1",
                    ),
                ],
            )],
        },
    ]
}

fn placeholder_slides() -> Vec<PromoSlide> {
    vec![
        PromoSlide {
            id: 1,
            image_url: placeholder_image("1200x400", "FFA07A", "FFFFFF", "Special+Offer+1"),
            title: "Burger Bonanza".to_string(),
            description: "Get 50% off on all beef burgers!".to_string(),
            link: "/restaurant-menu/r2".to_string(),
        },
        PromoSlide {
            id: 2,
            image_url: placeholder_image("1200x400", "98FB98", "000000", "Pizza+Fiesta"),
            title: "Pizza Fiesta".to_string(),
            description: "Buy one get one free on large pizzas.".to_string(),
            link: "/?q=italian".to_string(),
        },
        PromoSlide {
            id: 3,
            image_url: placeholder_image("1200x400", "ADD8E6", "FFFFFF", "Healthy+Bowls"),
            title: "Healthy Bowls".to_string(),
            description: "Fresh salad bowls starting at $7.99.".to_string(),
            link: "/?q=healthy".to_string(),
        },
    ]
}
