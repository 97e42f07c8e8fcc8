use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use crate::models::{FetchError, Page, Transaction};
use crate::sources::{EmployeeScopedSource, PaginatedSource};
use crate::types::{EmployeeId, PageIndex};

const DEFAULT_CAPACITY: u64 = 64;

/// Keeps the last responses of an inner source until they are invalidated.
///
/// Pages and employee-scoped results are cached separately so that invalidating one
/// fetch mode leaves the other one's responses alone.
pub struct CachedSource<S> {
    inner: S,
    pages: Cache<PageIndex, Page>,
    by_employee: Cache<EmployeeId, Vec<Transaction>>,
    capacity: u64,
    timeout: Option<Duration>
}

impl<S> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            pages: build_cache(DEFAULT_CAPACITY, None),
            by_employee: build_cache(DEFAULT_CAPACITY, None),
            capacity: DEFAULT_CAPACITY,
            timeout: None
        }
    }

    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.capacity = capacity;
        self.rebuild();
        self
    }

    pub fn with_cache_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self.rebuild();
        self
    }

    #[cfg(test)]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn rebuild(&mut self) {
        self.pages = build_cache(self.capacity, self.timeout);
        self.by_employee = build_cache(self.capacity, self.timeout);
    }
}

fn build_cache<K, V>(capacity: u64, timeout: Option<Duration>) -> Cache<K, V>
where
    K: std::hash::Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static
{
    let builder = Cache::builder().max_capacity(capacity);

    match timeout {
        Some(timeout) => builder.time_to_live(timeout).build(),
        None => builder.build()
    }
}

impl<S: PaginatedSource> PaginatedSource for CachedSource<S> {
    async fn fetch_page(&self, page: PageIndex) -> Result<Page, FetchError> {
        if let Some(cached) = self.pages.get(&page).await {
            debug!("Page [{page}] served from response cache");
            return Ok(cached);
        }

        let fetched = self.inner.fetch_page(page).await?;
        self.pages.insert(page, fetched.clone()).await;

        Ok(fetched)
    }

    fn invalidate(&self) {
        debug!("Invalidating cached transaction pages");
        self.pages.invalidate_all();
        self.inner.invalidate();
    }
}

impl<S: EmployeeScopedSource> EmployeeScopedSource for CachedSource<S> {
    async fn fetch_by_employee(&self, employee_id: &EmployeeId) -> Result<Vec<Transaction>, FetchError> {
        if let Some(cached) = self.by_employee.get(employee_id).await {
            debug!("Transactions for employee [{employee_id}] served from response cache");
            return Ok(cached);
        }

        let fetched = self.inner.fetch_by_employee(employee_id).await?;
        self.by_employee.insert(employee_id.clone(), fetched.clone()).await;

        Ok(fetched)
    }

    fn invalidate(&self) {
        debug!("Invalidating cached employee transactions");
        self.by_employee.invalidate_all();
        self.inner.invalidate();
    }
}
