//! HTTP client for the builder relayer.
//!
//! Endpoints:
//! - GET /nonce?address=&type=
//! - GET /relay-payload?address=&type=
//! - GET /transaction?id=
//! - GET /transactions (builder-authenticated)
//! - GET /deployed?address=
//! - POST /submit (builder-authenticated)

use std::sync::Arc;

use relayer_auth::BuilderConfig;
use relayer_crypto::{derive_proxy_address, derive_safe_address};
use relayer_encoder::TransactionEncoder;
use relayer_http::{HttpClient, Method, RequestOptions};
use relayer_signer::Signer;
use relayer_tx::{
    build_proxy_transaction_request, build_safe_create_request, build_safe_transaction_request,
    ZERO_ADDRESS,
};
use relayer_types::{
    format_address, Address, Call, ContractConfig, DeployedResponse, NoncePayload,
    ProxyTransaction, ProxyTransactionArgs, RelayError, RelayPayload, RelayerTransaction,
    RelayerTransactionResponse, Result, SafeCreateTransactionArgs, SafeTransaction,
    SafeTransactionArgs, TransactionRequest, TransactionType, WalletStyle,
};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::endpoints;
use crate::response::SubmittedTransaction;

/// Client for one relayer, chain and wallet style.
#[derive(Clone)]
pub struct RelayClient {
    relayer_url: String,
    chain_id: u64,
    wallet_style: WalletStyle,
    contracts: ContractConfig,
    http: HttpClient,
    encoder: TransactionEncoder,
    signer: Option<Arc<dyn Signer>>,
    builder_config: Option<BuilderConfig>,
}

impl std::fmt::Debug for RelayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayClient")
            .field("relayer_url", &self.relayer_url)
            .field("chain_id", &self.chain_id)
            .field("wallet_style", &self.wallet_style)
            .field("signer", &self.signer.as_ref().map(|s| s.address()))
            .field("builder_config", &self.builder_config)
            .finish()
    }
}

impl RelayClient {
    /// Fails with `ConfigUnsupported` when no contracts are known for `chain_id`.
    pub fn new(
        relayer_url: &str,
        chain_id: u64,
        signer: Option<Arc<dyn Signer>>,
        builder_config: Option<BuilderConfig>,
        wallet_style: WalletStyle,
    ) -> Result<Self> {
        let contracts = ContractConfig::for_chain(chain_id)?;
        Ok(Self {
            relayer_url: relayer_url.trim_end_matches('/').to_string(),
            chain_id,
            wallet_style,
            contracts,
            http: HttpClient::default(),
            encoder: TransactionEncoder::new(),
            signer,
            builder_config,
        })
    }

    /// Replace the transport (timeouts, retry policy).
    pub fn with_http_client(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn wallet_style(&self) -> WalletStyle {
        self.wallet_style
    }

    pub fn contracts(&self) -> &ContractConfig {
        &self.contracts
    }

    fn signer(&self) -> Result<&Arc<dyn Signer>> {
        self.signer.as_ref().ok_or(RelayError::MissingCapability("signer"))
    }

    fn builder(&self) -> Result<&BuilderConfig> {
        self.builder_config
            .as_ref()
            .filter(|c| c.is_valid())
            .ok_or_else(|| RelayError::InvalidCredentials("builder config is missing or incomplete".into()))
    }

    /// Safe wallet owned by the signer.
    pub fn expected_safe_address(&self) -> Result<Address> {
        let owner = self.signer()?.address();
        derive_safe_address(&owner, self.contracts.safe.safe_factory.as_ref())
    }

    /// Proxy wallet owned by the signer.
    pub fn expected_proxy_address(&self) -> Result<Address> {
        let owner = self.signer()?.address();
        derive_proxy_address(&owner, self.contracts.proxy.proxy_factory.as_ref())
    }

    pub async fn get_nonce(
        &self,
        address: &str,
        signer_type: TransactionType,
        cancel: &CancellationToken,
    ) -> Result<NoncePayload> {
        let options = RequestOptions::new()
            .param("address", address)
            .param("type", signer_type.as_str());
        self.send(Method::GET, endpoints::GET_NONCE, &options, cancel).await
    }

    pub async fn get_relay_payload(
        &self,
        address: &str,
        signer_type: TransactionType,
        cancel: &CancellationToken,
    ) -> Result<RelayPayload> {
        let options = RequestOptions::new()
            .param("address", address)
            .param("type", signer_type.as_str());
        self.send(Method::GET, endpoints::GET_RELAY_PAYLOAD, &options, cancel)
            .await
    }

    /// Records for one transaction id. Empty until the relayer has seen it.
    pub async fn get_transaction(
        &self,
        transaction_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<RelayerTransaction>> {
        let options = RequestOptions::new().param("id", transaction_id);
        self.send(Method::GET, endpoints::GET_TRANSACTION, &options, cancel)
            .await
    }

    /// All transactions submitted under the builder's credentials.
    pub async fn get_transactions(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<RelayerTransaction>> {
        self.send_authed(Method::GET, endpoints::GET_TRANSACTIONS, None, cancel)
            .await
    }

    pub async fn get_deployed(&self, safe_address: &str, cancel: &CancellationToken) -> Result<bool> {
        let options = RequestOptions::new().param("address", safe_address);
        let resp: DeployedResponse = self
            .send(Method::GET, endpoints::GET_DEPLOYED, &options, cancel)
            .await?;
        Ok(resp.deployed)
    }

    /// Sign and submit a batch of calls through the configured wallet style.
    #[instrument(skip_all, fields(style = self.wallet_style.as_str(), calls = calls.len()))]
    pub async fn execute(
        &self,
        calls: &[Call],
        metadata: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<SubmittedTransaction> {
        self.signer()?;
        self.builder()?;
        if calls.is_empty() {
            return Err(RelayError::invalid_argument("calls", "no transactions to execute"));
        }

        let request = match self.wallet_style {
            WalletStyle::Safe => {
                let txns: Vec<SafeTransaction> = calls.iter().map(SafeTransaction::from).collect();
                self.safe_request(txns, metadata, cancel).await?
            }
            WalletStyle::Proxy => {
                let txns: Vec<ProxyTransaction> = calls.iter().map(ProxyTransaction::from).collect();
                self.proxy_request(&txns, metadata, cancel).await?
            }
        };
        self.submit(&request, cancel).await
    }

    /// Deploy the signer's Safe. Fails with `AlreadyDeployed` if it exists.
    #[instrument(skip_all, fields(chain_id = self.chain_id))]
    pub async fn deploy(&self, cancel: &CancellationToken) -> Result<SubmittedTransaction> {
        let signer = self.signer()?;
        self.builder()?;
        let safe = self.expected_safe_address()?;
        if self.get_deployed(&format_address(&safe), cancel).await? {
            return Err(RelayError::AlreadyDeployed);
        }
        if !self.contracts.safe.is_valid() {
            return Err(RelayError::ConfigUnsupported("safe contracts".into()));
        }

        let args = SafeCreateTransactionArgs {
            from: format_address(&signer.address()),
            chain_id: self.chain_id,
            payment_token: ZERO_ADDRESS.to_string(),
            payment: "0".to_string(),
            payment_receiver: ZERO_ADDRESS.to_string(),
        };
        let request =
            build_safe_create_request(signer.as_ref(), &self.contracts.safe, &args, cancel).await?;
        self.submit(&request, cancel).await
    }

    async fn safe_request(
        &self,
        transactions: Vec<SafeTransaction>,
        metadata: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<TransactionRequest> {
        let signer = self.signer()?;
        if !self.contracts.safe.is_valid() {
            return Err(RelayError::ConfigUnsupported("safe contracts".into()));
        }
        let safe = self.expected_safe_address()?;
        if !self.get_deployed(&format_address(&safe), cancel).await? {
            return Err(RelayError::NotDeployed);
        }

        let from = format_address(&signer.address());
        let nonce = self.get_nonce(&from, TransactionType::Safe, cancel).await?;
        if nonce.nonce.is_empty() {
            return Err(RelayError::DecodeFailed("invalid nonce payload received".into()));
        }
        debug!(safe = %safe, nonce = %nonce.nonce, "building safe transaction");

        let args = SafeTransactionArgs {
            from,
            nonce: nonce.nonce,
            chain_id: self.chain_id,
            transactions,
        };
        build_safe_transaction_request(
            signer.as_ref(),
            &self.encoder,
            &args,
            &self.contracts.safe,
            metadata,
            cancel,
        )
        .await
    }

    async fn proxy_request(
        &self,
        transactions: &[ProxyTransaction],
        metadata: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<TransactionRequest> {
        let signer = self.signer()?;
        if !self.contracts.proxy.is_valid() {
            return Err(RelayError::ConfigUnsupported("proxy contracts".into()));
        }

        let from = format_address(&signer.address());
        let payload = self
            .get_relay_payload(&from, TransactionType::Proxy, cancel)
            .await?;
        debug!(relay = %payload.address, nonce = %payload.nonce, "building proxy transaction");

        let args = ProxyTransactionArgs {
            from,
            nonce: payload.nonce,
            gas_price: "0".to_string(),
            gas_limit: String::new(),
            data: self.encoder.encode_proxy(transactions)?,
            relay: payload.address,
        };
        build_proxy_transaction_request(
            signer.as_ref(),
            &args,
            &self.contracts.proxy,
            metadata,
            cancel,
        )
        .await
    }

    async fn submit(
        &self,
        request: &TransactionRequest,
        cancel: &CancellationToken,
    ) -> Result<SubmittedTransaction> {
        // Attribution signs these exact bytes, so serialize once.
        let body = serde_json::to_string(request)
            .map_err(|e| RelayError::Other(format!("encode request: {e}")))?;
        let resp: RelayerTransactionResponse = self
            .send_authed(Method::POST, endpoints::SUBMIT_TRANSACTION, Some(body), cancel)
            .await?;
        info!(
            transaction_id = %resp.transaction_id,
            state = %resp.state,
            kind = request.r#type.as_str(),
            "transaction submitted"
        );
        Ok(SubmittedTransaction::new(self.clone(), resp))
    }

    async fn send<T: DeserializeOwned + Default>(
        &self,
        method: Method,
        path: &str,
        options: &RequestOptions,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let url = format!("{}{}", self.relayer_url, path);
        self.http.execute(method, &url, options, cancel).await
    }

    /// Headers are computed per call over `method`, `path` and `body`.
    async fn send_authed<T: DeserializeOwned + Default>(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let headers = self
            .builder()?
            .headers(method.as_str(), path, body.as_deref(), 0, cancel)
            .await?
            .to_header_map()?;
        let options = RequestOptions {
            headers,
            body,
            ..Default::default()
        };
        self.send(method, path, &options, cancel).await
    }
}
