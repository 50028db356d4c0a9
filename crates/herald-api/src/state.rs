//! Application state wiring the concrete collaborators into the dispatcher.
//!
//! Every secret is resolved from the environment variable its config section
//! names; a missing secret for a required collaborator fails startup rather
//! than failing the first request that needs it.

use std::sync::Arc;

use anyhow::Context;
use secrecy::SecretString;

use herald_core::dispatch::{Dispatcher, Processors};
use herald_core::processor::article::ArticleProcessor;
use herald_core::processor::episodic::EpisodicProcessor;
use herald_core::processor::image::ImageProcessor;
use herald_core::processor::meme::MemeProcessor;
use herald_core::processor::social::SocialPostProcessor;
use herald_core::processor::video::VideoProcessor;
use herald_core::queue::LogFailureHandler;
use herald_core::retrieval::Retriever;
use herald_infra::config::secret_from_env;
use herald_infra::fetch::HttpPageFetcher;
use herald_infra::llm::OpenAiCompatProvider;
use herald_infra::media::{ImgflipClient, OpenAiImageClient, RunwayVideoClient};
use herald_infra::notify::TelegramNotifier;
use herald_infra::search::NewsSearchClient;
use herald_infra::vector::VectaraStore;
use herald_types::config::HeraldConfig;

/// Shared application state for the REST API.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

fn required_secret(var: &str) -> anyhow::Result<SecretString> {
    secret_from_env(var).with_context(|| format!("{var} must be set"))
}

impl AppState {
    /// Wire all collaborators and spawn the processor queues.
    pub fn init(config: HeraldConfig) -> anyhow::Result<Self> {
        let generator = Arc::new(OpenAiCompatProvider::new(
            config.llm.base_url.clone(),
            required_secret(&config.llm.api_key_env)?,
        ));
        let store = Arc::new(VectaraStore::new(
            &config.vector,
            required_secret(&config.vector.api_key_env)?,
        ));
        let notifier = Arc::new(
            TelegramNotifier::new(
                &config.telegram,
                required_secret(&config.telegram.api_token_env)?,
            ),
        );
        let search = Arc::new(NewsSearchClient::new(
            &config.search,
            required_secret(&config.search.api_key_env)?,
        ));
        let fetcher = Arc::new(HttpPageFetcher::new(&config.retrieval));
        // One retriever, so article and social share a seen-URL set.
        let retriever = Arc::new(Retriever::new(search, fetcher, &config.retrieval));

        let image = Arc::new(OpenAiImageClient::new(
            &config.media,
            required_secret(&config.media.image_api_key_env)?,
        ));
        let video = Arc::new(RunwayVideoClient::new(
            &config.media,
            required_secret(&config.media.video_api_key_env)?,
        ));
        let caption = Arc::new(ImgflipClient::new(
            &config.media,
            required_secret(&config.media.caption_username_env)?,
            required_secret(&config.media.caption_password_env)?,
        ));

        let failure = Arc::new(LogFailureHandler);
        let interaction = config.llm.interaction_model.clone();
        let notification = config.llm.notification_model.clone();

        let processors = Processors {
            article: ArticleProcessor::new(
                generator.clone(),
                interaction.clone(),
                notification.clone(),
                retriever.clone(),
                store.clone(),
                notifier.clone(),
                config.search.per_query_limit,
                failure.clone(),
            ),
            social: SocialPostProcessor::new(
                generator.clone(),
                interaction.clone(),
                notification.clone(),
                retriever,
                store.clone(),
                notifier.clone(),
                config.search.per_query_limit,
                failure.clone(),
            ),
            meme: MemeProcessor::new(
                generator.clone(),
                interaction.clone(),
                notification.clone(),
                caption,
                notifier.clone(),
                failure.clone(),
            ),
            image: ImageProcessor::new(
                generator.clone(),
                interaction.clone(),
                notification.clone(),
                image.clone(),
                notifier.clone(),
                failure.clone(),
            ),
            video: VideoProcessor::new(
                generator.clone(),
                interaction.clone(),
                notification,
                image,
                video,
                notifier,
                failure.clone(),
            ),
            episodic: EpisodicProcessor::new(
                generator.clone(),
                interaction.clone(),
                store,
                failure,
            ),
        };

        let dispatcher = Arc::new(Dispatcher::new(generator, interaction, processors));
        Ok(Self { dispatcher })
    }
}
