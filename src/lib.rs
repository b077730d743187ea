pub mod client;
pub mod connection;
pub mod expect;
pub mod resources;
pub mod response;
pub mod telnet;

#[cfg(test)]
mod testing;

// Re-export parser types for direct access
pub use response::{AttributeLine, AttributeTree, AttributeValue, ParseError, TableRow, parse_table};

// Re-export the main client API for easy access
pub use client::{
    CommandDriver, Credentials, ErrorCategory, JcliError, JcliResult, PromptState, Session,
    SessionConfig,
};
pub use resources::{
    FilterManager, GroupManager, HttpConnectorManager, MoRouterManager, MtRouterManager,
    SmppConnectorManager, UserManager,
};

/// A specialized `Result` type for console operations.
///
/// # Examples
///
/// ## Listing resources
///
/// Every operation opens its own session, runs a handful of commands and
/// releases the session again, whatever the outcome:
///
/// ```rust,no_run
/// use jcli::{GroupManager, Session, SessionConfig, UserManager};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = SessionConfig::new("127.0.0.1", 8990).with_credentials("jcliadmin", "jclipwd");
///
///     let (groups, users) = Session::scoped(&config, async |session| {
///         let groups = session.list_groups().await?;
///         let users = session.list_users().await?;
///         Ok((groups, users))
///     })
///     .await?;
///
///     for group in &groups {
///         println!("{} ({:?})", group.name, group.status);
///     }
///     println!("{} users", users.len());
///     Ok(())
/// }
/// ```
///
/// ## Handling errors at a boundary
///
/// ```rust,no_run
/// use jcli::{ErrorCategory, Session, SessionConfig, SmppConnectorManager};
///
/// # async fn example(config: SessionConfig) {
/// match Session::scoped(&config, async |s| s.start_smpp_connector("smsc-eu").await).await {
///     Ok(()) => println!("started"),
///     Err(e) if e.category() == ErrorCategory::NotFound => println!("no such connector"),
///     Err(e) => println!("failed: {e}"),
/// }
/// # }
/// ```
pub type Result<T> = JcliResult<T>;
