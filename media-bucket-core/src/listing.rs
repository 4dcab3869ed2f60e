//! Enumeration of media-library resources on top of a [`ResourceLister`].
//!
//! Two modes are offered:
//! - [`list_all`] follows every cursor of every requested type before returning.
//! - [`BatchStream`] hands out one page at a time and only requests the next page when
//!   the caller asks for it, keeping memory bounded for very large libraries.
//!
//! In both modes a page without resources ends the enumeration of that type, as does a
//! missing cursor. A listing error stops enumeration and is returned as
//! [`MigrateError::Listing`].

use tracing::{debug, error, info};

use crate::contract::{ResourceLister, ResourcePage, ResourceType};
use crate::error::MigrateError;

/// URLs of one resource type, in listing order.
pub type TypeListing = (ResourceType, Vec<String>);

/// One listing page of one resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub resource_type: ResourceType,
    /// 1-based position of this batch across the whole run.
    pub index: usize,
    pub urls: Vec<String>,
}

async fn fetch_page<L>(
    lister: &L,
    resource_type: ResourceType,
    max_results: Option<u32>,
    cursor: Option<String>,
) -> Result<ResourcePage, MigrateError>
where
    L: ResourceLister + ?Sized,
{
    debug!(%resource_type, ?max_results, ?cursor, "Requesting resource page");
    lister
        .list_page(resource_type, max_results, cursor)
        .await
        .map_err(|source| {
            error!(%resource_type, error = %source, "Listing resources failed");
            MigrateError::Listing {
                resource_type,
                source,
            }
        })
}

fn continuation(page: &ResourcePage) -> Option<String> {
    if page.urls.is_empty() {
        return None;
    }
    page.next_cursor.clone().filter(|c| !c.is_empty())
}

/// List every resource of every requested type, following cursors until exhausted.
pub async fn list_all<L>(
    lister: &L,
    resource_types: &[ResourceType],
    page_size: Option<u32>,
) -> Result<Vec<TypeListing>, MigrateError>
where
    L: ResourceLister + ?Sized,
{
    let mut listings = Vec::with_capacity(resource_types.len());

    for &resource_type in resource_types {
        let mut urls = Vec::new();
        let mut cursor = None;
        let mut pages = 0usize;

        loop {
            let page = fetch_page(lister, resource_type, page_size, cursor).await?;
            pages += 1;
            cursor = continuation(&page);
            urls.extend(page.urls);
            if cursor.is_none() {
                break;
            }
        }

        info!(%resource_type, pages, resources = urls.len(), "Listed resources");
        listings.push((resource_type, urls));
    }

    Ok(listings)
}

/// Pull-based page-by-page enumeration across resource types.
pub struct BatchStream<'a, L: ?Sized> {
    lister: &'a L,
    resource_types: Vec<ResourceType>,
    position: usize,
    cursor: Option<String>,
    page_size: u32,
    batches: usize,
}

impl<'a, L> BatchStream<'a, L>
where
    L: ResourceLister + ?Sized,
{
    pub fn new(lister: &'a L, resource_types: &[ResourceType], page_size: u32) -> Self {
        Self {
            lister,
            resource_types: resource_types.to_vec(),
            position: 0,
            cursor: None,
            page_size,
            batches: 0,
        }
    }

    /// Number of batches handed out so far.
    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Fetch the next page. `Ok(None)` once every type is exhausted.
    pub async fn next_batch(&mut self) -> Result<Option<Batch>, MigrateError> {
        while let Some(&resource_type) = self.resource_types.get(self.position) {
            let page = fetch_page(
                self.lister,
                resource_type,
                Some(self.page_size),
                self.cursor.take(),
            )
            .await?;

            self.cursor = continuation(&page);
            if self.cursor.is_none() {
                self.position += 1;
            }
            if page.urls.is_empty() {
                debug!(%resource_type, "Empty resource page, moving on");
                continue;
            }

            self.batches += 1;
            debug!(
                %resource_type,
                batch = self.batches,
                resources = page.urls.len(),
                has_more = self.cursor.is_some(),
                "Fetched resource batch"
            );
            return Ok(Some(Batch {
                resource_type,
                index: self.batches,
                urls: page.urls,
            }));
        }
        Ok(None)
    }
}
