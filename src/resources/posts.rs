//! Broadcast posts published to the creator's site.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::client::KitClient;
use crate::error::messages;
use crate::error::{KitError, Result};
use crate::http::Params;

pub const MAX_PER_PAGE: u32 = 50;

/// One page of `GET posts`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PostsPage {
    pub posts: Vec<Value>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
}

impl KitClient {
    /// One page of posts. `page` starts at 1; `per_page` is 1 to 50.
    pub async fn get_posts(&self, page: u32, per_page: u32) -> Result<PostsPage> {
        debug!(page, per_page, "get_posts");
        let invalid = if page < 1 {
            Some(messages::POSTS_PAGE_TOO_LOW)
        } else if per_page < 1 {
            Some(messages::POSTS_PER_PAGE_TOO_LOW)
        } else if per_page > MAX_PER_PAGE {
            Some(messages::POSTS_PER_PAGE_TOO_HIGH)
        } else {
            None
        };
        if let Some(message) = invalid {
            return Err(self.reject("get_posts", KitError::InvalidArgument(message.to_string())));
        }

        let response = self
            .get("posts", params(json!({ "page": page, "per_page": per_page })))
            .await?;
        let page: PostsPage = serde_json::from_value(response)
            .map_err(|_| self.reject("get_posts", KitError::unexpected_response()))?;
        if page.posts.is_empty() {
            debug!("no broadcasts exist");
        }
        Ok(page)
    }

    /// Every post, fetched `posts_per_request` at a time. A post returned on
    /// more than one page appears once, in its latest form.
    pub async fn get_all_posts(&self, posts_per_request: u32) -> Result<Vec<Value>> {
        let invalid = if posts_per_request < 1 {
            Some(messages::ALL_POSTS_PER_REQUEST_TOO_LOW)
        } else if posts_per_request > MAX_PER_PAGE {
            Some(messages::ALL_POSTS_PER_REQUEST_TOO_HIGH)
        } else {
            None
        };
        if let Some(message) = invalid {
            return Err(self.reject("get_all_posts", KitError::InvalidArgument(message.to_string())));
        }

        let mut posts: Vec<Value> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut page = 0;
        let mut total_pages = 1;

        while total_pages > page {
            page += 1;
            let response = self.get_posts(page, posts_per_request).await?;
            if response.posts.is_empty() {
                break;
            }
            for post in response.posts {
                let Some(id) = post.get("id").map(Value::to_string) else {
                    posts.push(post);
                    continue;
                };
                match positions.get(&id) {
                    Some(&index) => posts[index] = post,
                    None => {
                        positions.insert(id, posts.len());
                        posts.push(post);
                    }
                }
            }
            total_pages = response.total_pages;
        }

        debug!(count = posts.len(), pages = page, "get_all_posts");
        Ok(posts)
    }

    /// A single post by ID.
    pub async fn get_post(&self, post_id: u64) -> Result<Value> {
        debug!(post_id, "get_post");
        let mut response = self.get(&format!("posts/{post_id}"), Params::new()).await?;
        if let Some(message) = response.get("message").and_then(Value::as_str) {
            return Err(self.reject("get_post", KitError::UnexpectedResponse(message.to_string())));
        }
        match response.get_mut("post") {
            Some(post) => Ok(post.take()),
            None => Err(self.reject("get_post", KitError::unexpected_response())),
        }
    }
}

pub(crate) fn params(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}
