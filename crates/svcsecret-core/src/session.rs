// ── Session ──
//
// One SQL API client per run. Opening the session only builds the client;
// nothing touches the network until `identity()` or `submit()`.

use tracing::{debug, info};

use svcsecret_api::{SqlApiClient, StatementContext, TlsMode, TransportConfig};

use crate::config::{SessionConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{ChangeRequest, Identity};
use crate::procedure::{ProcedureOutcome, ProcedureParams};

const IDENTITY_QUERY: &str = "SELECT CURRENT_USER(), CURRENT_ROLE()";

/// A bootstrapped connection to one account.
pub struct Session {
    config: SessionConfig,
    client: SqlApiClient,
}

impl Session {
    /// Build the HTTP client from configuration.
    ///
    /// Fails on TLS setup or malformed credentials; both are fatal for the run.
    pub fn open(config: SessionConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let client = SqlApiClient::new(
            config.account_url.clone(),
            &config.auth.to_access_token(),
            &transport,
        )?;
        Ok(Self::with_client(config, client))
    }

    /// Wrap an existing client. The client's context is replaced with the
    /// role/warehouse/database/schema from `config`.
    pub fn with_client(config: SessionConfig, client: SqlApiClient) -> Self {
        let client = client
            .with_context(StatementContext {
                role: config.role.clone(),
                warehouse: config.warehouse.clone(),
                database: config.database.clone(),
                schema: config.schema.clone(),
            })
            .with_statement_timeout(config.statement_timeout);
        Self { config, client }
    }

    /// Who this session runs as.
    pub async fn identity(&self) -> Result<Identity, CoreError> {
        let rs = self.client.execute(IDENTITY_QUERY, &[]).await?;
        let user = rs
            .cell(0, 0)
            .ok_or_else(|| CoreError::UnexpectedResult("identity query returned no user".into()))?
            .to_owned();
        let role = rs.cell(0, 1).map(ToOwned::to_owned);
        debug!(%user, ?role, "resolved session identity");
        Ok(Identity { user, role })
    }

    /// Call the procedure once with the request's positional parameters.
    ///
    /// A returned status string is always `Ok`, even when it reports a
    /// failure. Errors mean the call itself failed and are wrapped in
    /// [`CoreError::ProcedureCall`].
    pub async fn submit(&self, request: &ChangeRequest) -> Result<ProcedureOutcome, CoreError> {
        let params = ProcedureParams::from_request(request);
        let statement = self.config.procedure.call_statement();
        info!(request = %request.summary(), ?params, "calling {}", self.config.procedure);

        let rs = self
            .client
            .execute(&statement, &params.to_bindings())
            .await
            .map_err(|e| CoreError::ProcedureCall(Box::new(e.into())))?;

        let message = rs.cell(0, 0).ok_or_else(|| {
            CoreError::ProcedureCall(Box::new(CoreError::UnexpectedResult(
                "procedure returned no result".into(),
            )))
        })?;

        let outcome = ProcedureOutcome::classify(message);
        debug!(success = outcome.is_success(), handle = ?rs.statement_handle, "procedure returned");
        Ok(outcome)
    }
}

/// Map core TLS config to the api transport config.
fn build_transport(config: &SessionConfig) -> TransportConfig {
    TransportConfig {
        tls: match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout: config.timeout,
    }
}
