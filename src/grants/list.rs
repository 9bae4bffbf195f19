//! Lazy, paginated grant listing.

use std::collections::HashSet;
use std::pin::Pin;
use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt, TryStreamExt};

use crate::transport::{GrantTransport, ListGrantsRequest};
use crate::types::Grant;
use crate::Error;

/// Stream of grants across every page of a listing.
///
/// Pages are fetched on demand. The stream ends when the backend reports no
/// further page; any other failure is yielded once and ends the stream.
pub type GrantStream = Pin<Box<dyn Stream<Item = Result<Grant, Error>> + Send>>;

enum Cursor {
    Start,
    Next { token: String, seen: HashSet<String> },
    Exhausted,
}

/// Streams every grant under `parent`, page by page.
pub(crate) fn grant_stream(
    transport: Arc<dyn GrantTransport>,
    parent: String,
    page_size: Option<u32>,
) -> GrantStream {
    let pages = stream::try_unfold(Cursor::Start, move |cursor| {
        let transport = Arc::clone(&transport);
        let parent = parent.clone();
        async move {
            let (page_token, mut seen) = match cursor {
                Cursor::Start => (None, HashSet::new()),
                Cursor::Next { token, seen } => (Some(token), seen),
                Cursor::Exhausted => return Ok(None),
            };

            let page = transport
                .list_grants(ListGrantsRequest {
                    parent: parent.clone(),
                    page_size,
                    page_token: page_token.clone(),
                })
                .await?;
            tracing::debug!(
                parent = %parent,
                grants = page.grants.len(),
                more = page.next_page_token.is_some(),
                "fetched grant page"
            );

            if let Some(token) = page_token {
                seen.insert(token);
            }
            let next = match page.next_page_token {
                Some(token) if seen.contains(&token) => {
                    return Err(Error::invalid_response(format!(
                        "backend repeated page token {token:?} while listing {parent}"
                    )));
                }
                Some(token) => Cursor::Next { token, seen },
                None => Cursor::Exhausted,
            };
            Ok(Some((page.grants, next)))
        }
    });

    pages
        .map_ok(|grants| stream::iter(grants.into_iter().map(|g| Ok(Grant::from(g)))))
        .try_flatten()
        .boxed()
}
