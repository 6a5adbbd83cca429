//! Cursor-paginated query that accumulates pages.

use std::collections::HashSet;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::{BoxFuture, Cancelled, QueryStatus};

type PageFetcherFn<P, E> = Box<dyn Fn(u32) -> BoxFuture<P, E> + Send + Sync>;
type NextParamFn<P> = Box<dyn Fn(&P, u32) -> Option<u32> + Send + Sync>;

/// A request that has been sent but not yet polled
struct PendingPage<P, E> {
  param: u32,
  receiver: mpsc::UnboundedReceiver<Result<P, E>>,
}

/// Infinite (load-more) query over an offset-paginated source.
///
/// Pages are requested strictly in sequence: page N+1 is only requested
/// once page N has arrived and yielded a cursor. Fetching the next page
/// leaves the status at `Success`, with `is_fetching_next_page()` set. A
/// failed page keeps every page loaded so far; `fetch_next_page()` retries it.
pub struct InfiniteQuery<P, E> {
  pages: Vec<P>,
  page_params: Vec<u32>,
  status: QueryStatus,
  error: Option<E>,
  /// Cursor for the page after the last loaded one
  next_param: Option<u32>,
  initial_param: u32,
  fetcher: PageFetcherFn<P, E>,
  get_next_param: NextParamFn<P>,
  pending: Option<PendingPage<P, E>>,
  fetched_at: Option<Instant>,
  stale_time: Duration,
}

impl<P: Send + 'static, E: Send + 'static> InfiniteQuery<P, E> {
  /// Create an infinite query.
  ///
  /// `fetcher` loads the page for a cursor; `get_next_param` derives the
  /// next cursor from a loaded page and the cursor that produced it, or
  /// None when there are no more pages.
  pub fn new<F, Fut, N>(initial_param: u32, fetcher: F, get_next_param: N) -> Self
  where
    F: Fn(u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<P, E>> + Send + 'static,
    N: Fn(&P, u32) -> Option<u32> + Send + Sync + 'static,
  {
    Self {
      pages: Vec::new(),
      page_params: Vec::new(),
      status: QueryStatus::Idle,
      error: None,
      next_param: None,
      initial_param,
      fetcher: Box::new(move |param| Box::pin(fetcher(param))),
      get_next_param: Box::new(get_next_param),
      pending: None,
      fetched_at: None,
      stale_time: Duration::from_secs(60),
    }
  }

  pub fn with_stale_time(mut self, duration: Duration) -> Self {
    self.stale_time = duration;
    self
  }

  pub fn status(&self) -> QueryStatus {
    self.status
  }

  /// Loaded pages, in request order
  pub fn pages(&self) -> &[P] {
    &self.pages
  }

  /// Cursor each loaded page was requested with
  pub fn page_params(&self) -> &[u32] {
    &self.page_params
  }

  pub fn error(&self) -> Option<&E> {
    self.error.as_ref()
  }

  /// First page in flight
  pub fn is_loading(&self) -> bool {
    self.status == QueryStatus::Loading && self.pages.is_empty()
  }

  pub fn is_fetching_next_page(&self) -> bool {
    self.pending.is_some() && !self.pages.is_empty()
  }

  pub fn has_next_page(&self) -> bool {
    self.next_param.is_some()
  }

  /// Age check on the first page; later pages ride along with it.
  pub fn is_stale(&self) -> bool {
    self
      .fetched_at
      .map(|t| t.elapsed() >= self.stale_time)
      .unwrap_or(false)
  }

  /// Load the first page if nothing is loaded or loading yet.
  pub fn fetch(&mut self) {
    if self.pending.is_some() || !self.pages.is_empty() {
      return;
    }
    self.status = QueryStatus::Loading;
    self.start(self.initial_param);
  }

  /// Load the next page. Returns false (and does nothing) if a request is
  /// already in flight, no page is loaded yet, or the list is exhausted.
  pub fn fetch_next_page(&mut self) -> bool {
    if self.pending.is_some() || self.pages.is_empty() {
      return false;
    }
    let Some(param) = self.next_param else {
      return false;
    };
    if self.status == QueryStatus::Error {
      self.status = QueryStatus::Loading;
    }
    self.start(param);
    true
  }

  /// Drop every page and start again from the first one.
  pub fn refetch(&mut self) {
    self.pending = None;
    self.pages.clear();
    self.page_params.clear();
    self.next_param = None;
    self.error = None;
    self.fetched_at = None;
    self.status = QueryStatus::Loading;
    self.start(self.initial_param);
  }

  /// Start over from the first page if the list has gone stale.
  ///
  /// Returns true if a fetch started. Does nothing while a page is in flight.
  pub fn refetch_if_stale(&mut self) -> bool {
    if self.pending.is_some() || !self.is_stale() {
      return false;
    }
    self.refetch();
    true
  }

  /// Poll for a pending page.
  ///
  /// Returns `true` if the state changed. Call this in your event loop
  /// tick handler.
  pub fn poll(&mut self) -> bool
  where
    E: From<Cancelled>,
  {
    let Some(pending) = &mut self.pending else {
      return false;
    };
    let param = pending.param;
    let outcome = match pending.receiver.try_recv() {
      Ok(result) => result,
      Err(mpsc::error::TryRecvError::Empty) => return false,
      Err(mpsc::error::TryRecvError::Disconnected) => Err(E::from(Cancelled)),
    };
    self.pending = None;
    self.apply(param, outcome);
    true
  }

  /// Wait for the pending page, then apply it. Returns `false` immediately
  /// if nothing is in flight.
  pub async fn settle(&mut self) -> bool
  where
    E: From<Cancelled>,
  {
    let Some(pending) = &mut self.pending else {
      return false;
    };
    let param = pending.param;
    let outcome = pending
      .receiver
      .recv()
      .await
      .unwrap_or_else(|| Err(E::from(Cancelled)));
    self.pending = None;
    self.apply(param, outcome);
    true
  }

  /// Every item across all pages, in page order, keeping only the first
  /// occurrence of each identity.
  pub fn items<'a, I, K, F, G>(&'a self, items_of: F, identity: G) -> Vec<&'a I>
  where
    F: Fn(&'a P) -> &'a [I],
    G: Fn(&I) -> K,
    K: Eq + Hash,
  {
    let mut seen = HashSet::new();
    self
      .pages
      .iter()
      .flat_map(|page| items_of(page).iter())
      .filter(|item| seen.insert(identity(*item)))
      .collect()
  }

  fn apply(&mut self, param: u32, outcome: Result<P, E>) {
    match outcome {
      Ok(page) => {
        if self.pages.is_empty() {
          self.fetched_at = Some(Instant::now());
        }
        self.next_param = (self.get_next_param)(&page, param);
        self.pages.push(page);
        self.page_params.push(param);
        self.error = None;
        self.status = QueryStatus::Success;
      }
      Err(error) => {
        self.error = Some(error);
        self.status = QueryStatus::Error;
      }
    }
  }

  fn start(&mut self, param: u32) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.pending = Some(PendingPage {
      param,
      receiver: rx,
    });

    let future = (self.fetcher)(param);
    tokio::spawn(async move {
      let result = future.await;
      // Ignore send errors - receiver may have been dropped
      let _ = tx.send(result);
    });
  }
}

impl<P, E: std::fmt::Debug> std::fmt::Debug for InfiniteQuery<P, E> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("InfiniteQuery")
      .field("status", &self.status)
      .field("pages", &self.pages.len())
      .field("page_params", &self.page_params)
      .field("next_param", &self.next_param)
      .field("error", &self.error)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::{Arc, Mutex};

  /// Pages of `size` consecutive numbers from a list of `total`
  fn numbers(
    total: u32,
    size: u32,
    requested: Arc<Mutex<Vec<u32>>>,
  ) -> InfiniteQuery<Vec<u32>, String> {
    InfiniteQuery::new(
      0,
      move |offset| {
        let requested = requested.clone();
        async move {
          requested.lock().unwrap().push(offset);
          tokio::time::sleep(Duration::from_millis(5)).await;
          Ok((offset..(offset + size).min(total)).collect::<Vec<u32>>())
        }
      },
      move |_page, offset| {
        let next = offset + size;
        (next < total).then_some(next)
      },
    )
  }

  #[tokio::test]
  async fn test_pages_accumulate_in_order() {
    let requested = Arc::new(Mutex::new(Vec::new()));
    let mut query = numbers(5, 2, requested.clone());

    assert_eq!(query.status(), QueryStatus::Idle);
    query.fetch();
    assert!(query.is_loading());
    assert!(query.settle().await);
    assert_eq!(query.status(), QueryStatus::Success);
    assert!(query.has_next_page());

    assert!(query.fetch_next_page());
    assert!(query.is_fetching_next_page());
    assert_eq!(query.status(), QueryStatus::Success);
    query.settle().await;

    assert!(query.fetch_next_page());
    query.settle().await;

    assert!(!query.has_next_page());
    assert!(!query.fetch_next_page());
    assert_eq!(query.page_params(), &[0, 2, 4]);
    assert_eq!(*requested.lock().unwrap(), vec![0, 2, 4]);

    let items: Vec<u32> = query
      .items(|p| p.as_slice(), |n| *n)
      .into_iter()
      .copied()
      .collect();
    assert_eq!(items, vec![0, 1, 2, 3, 4]);
  }

  #[tokio::test]
  async fn test_next_page_waits_for_current() {
    let requested = Arc::new(Mutex::new(Vec::new()));
    let mut query = numbers(10, 2, requested.clone());

    // No cursor before the first page lands
    query.fetch();
    assert!(!query.fetch_next_page());
    query.settle().await;

    assert!(query.fetch_next_page());
    // Already in flight
    assert!(!query.fetch_next_page());
    query.settle().await;

    assert_eq!(*requested.lock().unwrap(), vec![0, 2]);
  }

  #[tokio::test]
  async fn test_failed_page_keeps_loaded_pages() {
    let attempts = Arc::new(Mutex::new(0u32));
    let attempts_clone = attempts.clone();
    let mut query: InfiniteQuery<Vec<u32>, String> = InfiniteQuery::new(
      0,
      move |offset| {
        let attempts = attempts_clone.clone();
        async move {
          let attempt = {
            let mut a = attempts.lock().unwrap();
            *a += 1;
            *a
          };
          if attempt == 2 {
            Err("upstream hiccup".to_string())
          } else {
            Ok(vec![offset])
          }
        }
      },
      |_page, offset| (offset < 2).then_some(offset + 1),
    );

    query.fetch();
    query.settle().await;
    assert!(query.fetch_next_page());
    query.settle().await;

    assert_eq!(query.status(), QueryStatus::Error);
    assert_eq!(query.error().map(String::as_str), Some("upstream hiccup"));
    assert_eq!(query.pages().len(), 1);
    assert!(query.has_next_page());

    assert!(query.fetch_next_page());
    assert_eq!(query.status(), QueryStatus::Loading);
    query.settle().await;
    assert_eq!(query.status(), QueryStatus::Success);
    assert_eq!(query.page_params(), &[0, 1]);
    assert!(query.error().is_none());
  }

  #[tokio::test]
  async fn test_items_skip_duplicates_across_pages() {
    let mut query: InfiniteQuery<Vec<&'static str>, String> = InfiniteQuery::new(
      0,
      |offset| async move {
        Ok(match offset {
          0 => vec!["bulbasaur", "ivysaur"],
          _ => vec!["ivysaur", "venusaur"],
        })
      },
      |_page, offset| (offset == 0).then_some(2),
    );

    query.fetch();
    query.settle().await;
    query.fetch_next_page();
    query.settle().await;

    let names: Vec<&str> = query
      .items(|p| p.as_slice(), |name| *name)
      .into_iter()
      .copied()
      .collect();
    assert_eq!(names, vec!["bulbasaur", "ivysaur", "venusaur"]);
  }

  #[tokio::test]
  async fn test_refetch_starts_over() {
    let requested = Arc::new(Mutex::new(Vec::new()));
    let mut query = numbers(6, 2, requested.clone());

    query.fetch();
    query.settle().await;
    query.fetch_next_page();
    query.settle().await;
    assert_eq!(query.pages().len(), 2);

    query.refetch();
    assert!(query.is_loading());
    assert!(query.pages().is_empty());
    query.settle().await;
    assert_eq!(query.page_params(), &[0]);
    assert_eq!(*requested.lock().unwrap(), vec![0, 2, 0]);
  }

  #[tokio::test(start_paused = true)]
  async fn test_staleness_tracks_first_page() {
    let mut query = numbers(4, 2, Arc::new(Mutex::new(Vec::new())))
      .with_stale_time(Duration::from_secs(300));
    assert!(!query.is_stale());

    query.fetch();
    query.settle().await;
    assert!(!query.is_stale());

    tokio::time::advance(Duration::from_secs(300)).await;
    assert!(query.is_stale());
  }

  #[tokio::test(start_paused = true)]
  async fn test_refetch_if_stale_reloads_first_page() {
    let requested = Arc::new(Mutex::new(Vec::new()));
    let mut query =
      numbers(6, 2, requested.clone()).with_stale_time(Duration::from_secs(300));

    // Nothing loaded yet
    assert!(!query.refetch_if_stale());

    query.fetch();
    query.settle().await;
    query.fetch_next_page();
    query.settle().await;
    assert!(!query.refetch_if_stale());

    tokio::time::advance(Duration::from_secs(300)).await;
    assert!(query.refetch_if_stale());
    assert!(query.is_loading());
    assert!(query.pages().is_empty());
    // Already in flight
    assert!(!query.refetch_if_stale());

    query.settle().await;
    assert_eq!(query.status(), QueryStatus::Success);
    assert!(!query.is_stale());
    assert_eq!(*requested.lock().unwrap(), vec![0, 2, 0]);
  }
}
