//! MongoDB-backed repository implementations.

mod todos;

use std::future::IntoFuture;
use std::time::Duration;

use mongodb::{
    Client, Collection, IndexModel,
    bson::doc,
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::{ClientOptions, IndexOptions},
};

use crate::application::repos::RepoError;
use crate::config::StoreSettings;

use todos::TodoDocument;

const APP_NAME: &str = "todos";
const TYPE_INDEX_NAME: &str = "type_unique";
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Clone)]
pub struct MongoRepositories {
    client: Client,
    database: String,
    todos: Collection<TodoDocument>,
    timeout: Duration,
}

impl MongoRepositories {
    /// Build a pooled client. The driver connects lazily; call [`Self::ensure_indexes`]
    /// or a ping to surface connectivity problems at startup.
    pub async fn connect(settings: &StoreSettings) -> Result<Self, MongoError> {
        let mut options = ClientOptions::parse(&settings.uri).await?;
        options.app_name = Some(APP_NAME.to_string());
        options.connect_timeout = Some(settings.timeout);
        options.server_selection_timeout = Some(settings.timeout);

        let client = Client::with_options(options)?;
        let todos = client
            .database(&settings.database)
            .collection::<TodoDocument>(&settings.collection);

        Ok(Self {
            client,
            database: settings.database.clone(),
            todos,
            timeout: settings.timeout,
        })
    }

    /// Unique index on `type`; duplicate creates race safely against it.
    pub async fn ensure_indexes(&self) -> Result<(), RepoError> {
        let options = IndexOptions::builder()
            .unique(true)
            .name(TYPE_INDEX_NAME.to_string())
            .build();
        let model = IndexModel::builder()
            .keys(doc! { "type": 1 })
            .options(options)
            .build();

        within(self.timeout, self.todos.create_index(model))
            .await
            .map(|_| ())
    }

    pub async fn health_check(&self) -> Result<(), RepoError> {
        within(
            self.timeout,
            self.client
                .database(&self.database)
                .run_command(doc! { "ping": 1 }),
        )
        .await
        .map(|_| ())
    }
}

/// Apply the per-call timeout and translate driver errors.
async fn within<T>(
    limit: Duration,
    operation: impl IntoFuture<Output = Result<T, MongoError>>,
) -> Result<T, RepoError> {
    match tokio::time::timeout(limit, operation.into_future()).await {
        Ok(result) => result.map_err(map_mongo_error),
        Err(_) => Err(RepoError::Timeout),
    }
}

pub fn map_mongo_error(err: MongoError) -> RepoError {
    let duplicate = match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) => write.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(command) => command.code == DUPLICATE_KEY_CODE,
        _ => false,
    };

    if duplicate {
        RepoError::duplicate(TYPE_INDEX_NAME)
    } else {
        RepoError::from_persistence(err)
    }
}
