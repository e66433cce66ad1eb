use std::sync::Arc;

use crate::api::{Gateway, LogOnly, LoginBoundary};
use crate::collection::ResourceController;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::models::{AdminLogEntry, Category, CommunityTask, Post, User};
use crate::services::{
    AnalyticsService, AuthService, CategoryService, LogService, PostService, TaskService,
    UserService,
};
use crate::session::storage::CredentialStorage;
use crate::session::SessionStore;

/// Everything a console page needs, wired to one session and one gateway
#[derive(Clone)]
pub struct AdminClient {
    config: Arc<ClientConfig>,
    session: Arc<SessionStore>,
    gateway: Arc<Gateway>,
    pub auth: AuthService,
    pub users: Arc<UserService>,
    pub posts: Arc<PostService>,
    pub logs: Arc<LogService>,
    pub tasks: Arc<TaskService>,
    pub categories: Arc<CategoryService>,
    pub analytics: AnalyticsService,
}

impl AdminClient {
    pub fn new(
        config: ClientConfig,
        storage: Arc<dyn CredentialStorage>,
        boundary: Arc<dyn LoginBoundary>,
    ) -> Result<Self> {
        let session = Arc::new(SessionStore::new(storage));
        let gateway = Arc::new(Gateway::new(&config, Arc::clone(&session), boundary)?);

        Ok(Self {
            config: Arc::new(config),
            session,
            auth: AuthService::new(Arc::clone(&gateway)),
            users: Arc::new(UserService::new(Arc::clone(&gateway))),
            posts: Arc::new(PostService::new(Arc::clone(&gateway))),
            logs: Arc::new(LogService::new(Arc::clone(&gateway))),
            tasks: Arc::new(TaskService::new(Arc::clone(&gateway))),
            categories: Arc::new(CategoryService::new(Arc::clone(&gateway))),
            analytics: AnalyticsService::new(Arc::clone(&gateway)),
            gateway,
        })
    }

    /// Client whose forced logouts are only logged
    pub fn headless(config: ClientConfig, storage: Arc<dyn CredentialStorage>) -> Result<Self> {
        Self::new(config, storage, Arc::new(LogOnly))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    pub fn users_page(&self) -> ResourceController<User, UserService> {
        ResourceController::new(Arc::clone(&self.users), self.config.paging.page_size)
    }

    pub fn posts_page(&self) -> ResourceController<Post, PostService> {
        ResourceController::new(Arc::clone(&self.posts), self.config.paging.page_size)
    }

    /// Logs start at the configured limit and grow by re-fetching
    pub fn logs_page(&self) -> ResourceController<AdminLogEntry, LogService> {
        ResourceController::new(Arc::clone(&self.logs), self.config.paging.logs_limit)
    }

    pub fn tasks_page(&self) -> ResourceController<CommunityTask, TaskService> {
        ResourceController::new(Arc::clone(&self.tasks), self.config.paging.page_size)
    }

    pub fn categories_page(&self) -> ResourceController<Category, CategoryService> {
        ResourceController::new(Arc::clone(&self.categories), self.config.paging.page_size)
    }
}
