//! Starter data for a fresh database.

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::NewCategory;
use crate::features::categories::services::{CategoryService, SaveCategoryOutcome};
use crate::features::categories::models::Category;
use crate::features::pages::dtos::NewPage;
use crate::features::pages::models::Page;
use crate::features::pages::services::PageService;

pub struct SeedPage {
    pub title: &'static str,
    pub url: &'static str,
    pub views: i32,
}

pub struct SeedCategory {
    pub name: &'static str,
    pub views: i32,
    pub likes: i32,
    pub pages: &'static [SeedPage],
}

pub const SEED_CATEGORIES: &[SeedCategory] = &[
    SeedCategory {
        name: "Python",
        views: 128,
        likes: 64,
        pages: &[
            SeedPage {
                title: "Official Python Tutorial",
                url: "http://docs.python.org/2/tutorial/",
                views: 50,
            },
            SeedPage {
                title: "How to Think like a Computer Scientist",
                url: "http://www.greenteapress.com/thinkpython/",
                views: 20,
            },
            SeedPage {
                title: "Learn Python in 10 Minutes",
                url: "http://www.korokithakis.net/tutorials/python/",
                views: 5,
            },
        ],
    },
    SeedCategory {
        name: "Django",
        views: 64,
        likes: 32,
        pages: &[
            SeedPage {
                title: "Official Django Tutorial",
                url: "https://docs.djangoproject.com/en/1.9/intro/tutorial01/",
                views: 45,
            },
            SeedPage {
                title: "Django Rocks",
                url: "http://www.djangorocks.com/",
                views: 15,
            },
            SeedPage {
                title: "How to Tango with Django",
                url: "http://www.tangowithdjango.com/",
                views: 2,
            },
        ],
    },
    SeedCategory {
        name: "Other Frameworks",
        views: 32,
        likes: 16,
        pages: &[
            SeedPage {
                title: "Bottle",
                url: "http://bottlepy.org/docs/dev/",
                views: 5,
            },
            SeedPage {
                title: "Flask",
                url: "http://flask.pocoo.org",
                views: 1,
            },
        ],
    },
];

/// Get-or-create every seed category and page, resetting their counters.
///
/// Returns each category with the pages it now holds.
pub async fn populate(
    category_service: &CategoryService,
    page_service: &PageService,
) -> Result<Vec<(Category, Vec<Page>)>> {
    let mut seeded = Vec::with_capacity(SEED_CATEGORIES.len());

    for seed in SEED_CATEGORIES {
        let category = match category_service
            .save(&NewCategory::new(seed.name, seed.views, seed.likes))
            .await?
        {
            SaveCategoryOutcome::Saved(category) => category,
            SaveCategoryOutcome::SlugTaken(other) => {
                return Err(AppError::Internal(format!(
                    "Cannot seed '{}': slug is used by '{}'",
                    seed.name, other.name
                )));
            }
        };

        for page in seed.pages {
            let page = NewPage {
                title: page.title.to_string(),
                url: page.url.to_string(),
                views: page.views,
            };
            page_service.upsert(category.id, &page).await?;
        }

        let pages = page_service.list_by_category(category.id).await?;
        seeded.push((category, pages));
    }

    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    use crate::shared::validation::{slugify, SLUG_REGEX};

    #[test]
    fn test_seed_categories() {
        let names: Vec<_> = SEED_CATEGORIES.iter().map(|c| c.name).collect();
        assert_eq!(names, ["Python", "Django", "Other Frameworks"]);

        let counters: Vec<_> = SEED_CATEGORIES.iter().map(|c| (c.views, c.likes)).collect();
        assert_eq!(counters, [(128, 64), (64, 32), (32, 16)]);

        for category in SEED_CATEGORIES {
            assert!(SLUG_REGEX.is_match(&slugify(category.name)));
        }
    }

    #[test]
    fn test_seed_pages_are_valid() {
        let total: usize = SEED_CATEGORIES.iter().map(|c| c.pages.len()).sum();
        assert_eq!(total, 8);

        for page in SEED_CATEGORIES.iter().flat_map(|c| c.pages) {
            let page = NewPage {
                title: page.title.to_string(),
                url: page.url.to_string(),
                views: page.views,
            };
            assert!(page.validate().is_ok(), "{:?} should be valid", page);
        }
    }
}
