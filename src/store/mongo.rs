use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mongodb::bson::{doc, Bson, Document};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::options::{ClientOptions, Credential, FindOptions, ServerAddress};
use mongodb::sync::{Client, Database};
use tracing::{debug, warn};

use super::{Connector, RecordCursor, Session};
use crate::config::StoreConfig;
use crate::error::LookupError;
use crate::query::{Condition, Filter, LookupQuery, Record};

// Server code for a lost or rejected login. `Unauthorized` (13) is a missing
// privilege on an authenticated session and does not qualify.
const AUTHENTICATION_FAILED: i32 = 18;

/// MongoDB backend using the driver's blocking API.
pub struct MongoConnector {
    config: StoreConfig,
}

impl MongoConnector {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    fn client_options(&self) -> Result<ClientOptions, LookupError> {
        let address = ServerAddress::parse(format!("{}:{}", self.config.host, self.config.port))
            .map_err(|err| LookupError::Connection(err.to_string()))?;

        let credential = Credential::builder()
            .username(self.config.username.clone())
            .password(self.config.password.clone())
            .source(self.config.db.clone())
            .build();

        Ok(ClientOptions::builder()
            .hosts(vec![address])
            .credential(credential)
            .app_name("ordnance".to_string())
            .connect_timeout(self.config.connect_timeout())
            .server_selection_timeout(self.config.server_selection_timeout())
            .build())
    }
}

impl Connector for MongoConnector {
    fn connect(&self) -> Result<Arc<dyn Session>, LookupError> {
        let client = Client::with_options(self.client_options()?).map_err(connect_error)?;
        let database = client.database(&self.config.db);

        // The driver authenticates lazily; a ping forces the handshake so bad
        // credentials surface here rather than on the first find.
        database
            .run_command(doc! { "ping": 1 }, None)
            .map_err(connect_error)?;

        debug!(store = %self.describe(), "mongo session authenticated");

        Ok(Arc::new(MongoSession {
            _client: client,
            database,
            authenticated: AtomicBool::new(true),
        }))
    }

    fn describe(&self) -> String {
        format!(
            "mongo://{}:{}/{}",
            self.config.host, self.config.port, self.config.db
        )
    }
}

struct MongoSession {
    _client: Client,
    database: Database,
    authenticated: AtomicBool,
}

impl MongoSession {
    fn query_error(&self, err: MongoError) -> LookupError {
        if is_auth_failure(&err) {
            self.authenticated.store(false, Ordering::SeqCst);
            warn!(error = %err, "mongo session lost authentication");
            LookupError::Authentication(err.to_string())
        } else {
            LookupError::Query(err.to_string())
        }
    }
}

impl Session for MongoSession {
    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    fn find(&self, query: &LookupQuery) -> Result<RecordCursor<'_>, LookupError> {
        let collection = self.database.collection::<Document>(query.collection());

        let mut options = FindOptions::default();
        if query.cap() > 0 {
            options.limit = Some(i64::try_from(query.cap()).unwrap_or(i64::MAX));
        }

        let filter = filter_document(query.filter());
        let cursor = collection
            .find(filter, options)
            .map_err(|err| self.query_error(err))?;

        Ok(Box::new(cursor.map(move |item| {
            item.map(document_to_record)
                .map_err(|err| self.query_error(err))
        })))
    }
}

/// Translate a filter into a find document: equality as a plain value, ranges
/// as `{ "$gte": min, "$lte": max }`.
pub(crate) fn filter_document(filter: &Filter) -> Document {
    let mut document = Document::new();
    for condition in filter.conditions() {
        match condition {
            Condition::Equals { field, value } => {
                document.insert(field.as_str(), value.as_str());
            }
            Condition::Range { field, min, max } => {
                document.insert(field.as_str(), doc! { "$gte": *min, "$lte": *max });
            }
        }
    }
    document
}

fn document_to_record(document: Document) -> Record {
    Bson::Document(document).into_relaxed_extjson()
}

fn is_auth_failure(err: &MongoError) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Authentication { .. } => true,
        ErrorKind::Command(command) => is_auth_failure_code(command.code),
        _ => false,
    }
}

fn is_auth_failure_code(code: i32) -> bool {
    code == AUTHENTICATION_FAILED
}

fn connect_error(err: MongoError) -> LookupError {
    if is_auth_failure(&err) {
        LookupError::Authentication(err.to_string())
    } else {
        LookupError::Connection(err.to_string())
    }
}
