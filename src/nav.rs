use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::feed::FeedSynchronizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Feed,
    Write,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Feed => "feed",
            Tab::Write => "write",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Tab::Feed => "/feed",
            Tab::Write => "/write",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "feed" => Ok(Tab::Feed),
            "write" => Ok(Tab::Write),
            other => Err(format!("unknown tab: {}", other)),
        }
    }
}

/// Which view is showing. Lives only as long as the process.
#[derive(Clone)]
pub struct NavigationShell {
    active: Arc<Mutex<Tab>>,
    feed: FeedSynchronizer,
}

impl NavigationShell {
    pub fn new(feed: FeedSynchronizer) -> Self {
        Self {
            active: Arc::new(Mutex::new(Tab::default())),
            feed,
        }
    }

    pub async fn active(&self) -> Tab {
        *self.active.lock().await
    }

    /// Switch views. Leaving the feed tears its view down.
    pub async fn switch_to(&self, tab: Tab) {
        let previous = {
            let mut active = self.active.lock().await;
            std::mem::replace(&mut *active, tab)
        };

        if previous == Tab::Feed && tab != Tab::Feed {
            self.feed.unmount().await;
        }
        if previous != tab {
            tracing::debug!(from = %previous, to = %tab, "Switched tab");
        }
    }
}
