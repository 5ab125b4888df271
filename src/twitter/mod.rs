use crate::core::{Metadata, Source, SourceKind};
use crate::error::Result;
use async_trait::async_trait;

pub mod api;
pub mod scrape;
pub mod types;
pub mod utils;

pub use utils::{canonical_url, is_twitter_url, parse_id};

/// Public embed widget endpoint
#[derive(Debug, Clone)]
pub struct SyndicationSource;

/// Third-party mirror API serving post JSON
#[derive(Debug, Clone)]
pub struct MirrorSource {
    kind: SourceKind,
    template: &'static str,
}

/// Official GraphQL API with a guest token
#[derive(Debug, Clone)]
pub struct GraphqlSource;

/// Post page HTML
#[derive(Debug, Clone)]
pub struct PageSource;

pub static SYNDICATION: SyndicationSource = SyndicationSource;
pub static FXTWITTER: MirrorSource = MirrorSource {
    kind: SourceKind::FxTwitter,
    template: api::FXTWITTER_API,
};
pub static VXTWITTER: MirrorSource = MirrorSource {
    kind: SourceKind::VxTwitter,
    template: api::VXTWITTER_API,
};
pub static GRAPHQL: GraphqlSource = GraphqlSource;
pub static PAGE: PageSource = PageSource;

#[async_trait]
impl Source for SyndicationSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Syndication
    }

    async fn fetch(&self, client: &reqwest::Client, post_id: &str) -> Result<Metadata> {
        api::fetch_syndication(client, post_id)
            .await
            .map(Metadata::Json)
    }
}

#[async_trait]
impl Source for MirrorSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch(&self, client: &reqwest::Client, post_id: &str) -> Result<Metadata> {
        api::fetch_mirror(client, self.template, post_id)
            .await
            .map(Metadata::Json)
    }
}

#[async_trait]
impl Source for GraphqlSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Graphql
    }

    async fn fetch(&self, client: &reqwest::Client, post_id: &str) -> Result<Metadata> {
        api::fetch_graphql(client, post_id).await.map(Metadata::Json)
    }
}

#[async_trait]
impl Source for PageSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Page
    }

    async fn fetch(&self, client: &reqwest::Client, post_id: &str) -> Result<Metadata> {
        api::fetch_page(client, post_id).await.map(Metadata::Html)
    }
}
