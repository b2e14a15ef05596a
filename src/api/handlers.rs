//! REST API handlers for vault operations

use crate::crypto::{digest_from_hex, Address};
use crate::multisig::{TransactionKind, TransactionRecord, Vault, VaultError};
use crate::storage::Storage;
use crate::transfer::AssetBook;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub vault: Arc<RwLock<Vault<AssetBook>>>,
    pub storage: Arc<Storage>,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct VaultInfo {
    pub contract_id: String,
    pub initialized: bool,
    pub threshold: u8,
    pub signers: Vec<String>,
    pub description: String,
    pub transaction_count: u64,
}

#[derive(Debug, Serialize)]
pub struct TransactionInfo {
    pub id: u64,
    pub kind: TransactionKind,
    pub amount: u128,
    pub recipient: String,
    pub token: Option<String>,
    pub executed: bool,
    pub status: String,
    pub signatures_collected: usize,
    pub signatures_required: u8,
    pub signed_by: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SigningHashResponse {
    pub txn_id: u64,
    pub caller: String,
    pub hash: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitSignatureResponse {
    pub txn_id: u64,
    pub executed: bool,
    pub transaction: TransactionInfo,
}

#[derive(Debug, Serialize)]
pub struct ProposeResponse {
    pub txn_id: u64,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    /// Stable vault error code, when the failure came from the engine
    pub code: Option<u32>,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct InitializeRequest {
    pub signers: Vec<String>,
    pub threshold: u8,
}

#[derive(Deserialize)]
pub struct ProposeTransactionRequest {
    pub proposer: String,
    pub kind: TransactionKind,
    pub amount: u128,
    pub recipient: String,
    pub token: Option<String>,
}

#[derive(Deserialize)]
pub struct SigningHashQuery {
    pub caller: String,
}

#[derive(Deserialize)]
pub struct SubmitSignatureRequest {
    /// Hex-encoded 32-byte digest
    pub hash: String,
    /// Hex-encoded 65-byte recoverable signature
    pub signature: String,
}

// ============================================================================
// Helpers
// ============================================================================

fn vault_error(e: VaultError) -> (StatusCode, Json<ApiError>) {
    let status = match &e {
        VaultError::UnknownTransaction(_) => StatusCode::NOT_FOUND,
        VaultError::Unauthorized(_)
        | VaultError::UnauthorizedSigner(_)
        | VaultError::SignatureRecoveryFailed(_) => StatusCode::FORBIDDEN,
        VaultError::AlreadyInitialized
        | VaultError::AlreadyExecuted(_)
        | VaultError::TransferFailed(_) => StatusCode::CONFLICT,
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(ApiError {
            error: e.to_string(),
            code: Some(e.code()),
        }),
    )
}

fn bad_request(error: String) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(ApiError { error, code: None }))
}

fn storage_error(e: impl std::fmt::Display) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError {
            error: format!("Failed to persist vault: {}", e),
            code: None,
        }),
    )
}

/// Malformed or mistyped request bodies, in the same JSON shape as every other error
fn json_rejection(rejection: JsonRejection) -> (StatusCode, Json<ApiError>) {
    (
        rejection.status(),
        Json(ApiError {
            error: rejection.body_text(),
            code: None,
        }),
    )
}

/// Apply `op` and save the result; if saving fails the vault is put back
/// exactly as it was
fn commit<T>(
    storage: &Storage,
    vault: &mut Vault<AssetBook>,
    op: impl FnOnce(&mut Vault<AssetBook>) -> Result<T, VaultError>,
) -> Result<T, (StatusCode, Json<ApiError>)> {
    let snapshot = vault.snapshot();
    let value = op(&mut *vault).map_err(vault_error)?;

    if let Err(e) = storage.save(vault.state(), vault.effect()) {
        log::error!("Failed to persist vault, reverting in-memory change: {}", e);
        vault.restore(snapshot);
        return Err(storage_error(e));
    }
    Ok(value)
}

fn transaction_info(
    vault: &Vault<AssetBook>,
    id: u64,
    record: &TransactionRecord,
) -> TransactionInfo {
    let signed_by: Vec<String> = vault
        .authorizations(id)
        .iter()
        .map(|entry| entry.signer.to_string())
        .collect();

    TransactionInfo {
        id,
        kind: record.kind,
        amount: record.amount,
        recipient: record.recipient.to_string(),
        token: record.token.as_ref().map(Address::to_string),
        executed: record.executed,
        status: vault
            .transaction_status(id)
            .map(|s| format!("{:?}", s))
            .unwrap_or_default(),
        signatures_collected: signed_by.len(),
        signatures_required: vault.threshold(),
        signed_by,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health - Health check
pub async fn health_check() -> &'static str {
    "OK"
}

/// GET /api/vault - Vault configuration
pub async fn get_vault_info(State(state): State<ApiState>) -> Json<VaultInfo> {
    let vault = state.vault.read().await;
    Json(VaultInfo {
        contract_id: vault.contract_id().to_string(),
        initialized: vault.is_initialized(),
        threshold: vault.threshold(),
        signers: vault.signers().iter().map(Address::to_string).collect(),
        description: vault.state().registry.description(),
        transaction_count: vault.transaction_count(),
    })
}

/// POST /api/vault/init - Register signers and threshold
pub async fn initialize_vault(
    State(state): State<ApiState>,
    payload: Result<Json<InitializeRequest>, JsonRejection>,
) -> ApiResult<VaultInfo> {
    let Json(req) = payload.map_err(json_rejection)?;
    {
        let mut vault = state.vault.write().await;
        let signers: Vec<Address> = req.signers.into_iter().map(Address::from).collect();
        commit(&state.storage, &mut vault, |vault| {
            vault.initialize(signers, req.threshold)
        })?;
    }

    Ok(get_vault_info(State(state)).await)
}

/// GET /api/transactions - List all transactions
pub async fn list_transactions(State(state): State<ApiState>) -> Json<Vec<TransactionInfo>> {
    let vault = state.vault.read().await;
    let transactions = vault
        .transactions()
        .map(|(id, record)| transaction_info(&vault, id, record))
        .collect();
    Json(transactions)
}

/// POST /api/transactions - Propose a transaction
pub async fn propose_transaction(
    State(state): State<ApiState>,
    payload: Result<Json<ProposeTransactionRequest>, JsonRejection>,
) -> ApiResult<ProposeResponse> {
    let Json(req) = payload.map_err(json_rejection)?;
    let mut vault = state.vault.write().await;

    let txn_id = commit(&state.storage, &mut vault, |vault| {
        vault.propose_transaction(
            &Address::from(req.proposer),
            req.kind,
            req.amount,
            Address::from(req.recipient),
            req.token.map(Address::from),
        )
    })?;

    Ok(Json(ProposeResponse { txn_id }))
}

/// GET /api/transactions/{id} - Get transaction
pub async fn get_transaction(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
) -> ApiResult<TransactionInfo> {
    let vault = state.vault.read().await;
    let record = vault
        .get_transaction(id)
        .ok_or_else(|| vault_error(VaultError::UnknownTransaction(id)))?;
    Ok(Json(transaction_info(&vault, id, record)))
}

/// GET /api/transactions/{id}/hash?caller= - Digest to sign
pub async fn get_signing_hash(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
    Query(query): Query<SigningHashQuery>,
) -> ApiResult<SigningHashResponse> {
    let vault = state.vault.read().await;
    let caller = Address::from(query.caller);
    let hash = vault
        .request_signing_hash(id, &caller)
        .map_err(vault_error)?;

    Ok(Json(SigningHashResponse {
        txn_id: id,
        caller: caller.to_string(),
        hash: hex::encode(hash),
    }))
}

/// POST /api/transactions/{id}/signatures - Submit a signature
pub async fn submit_signature(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
    payload: Result<Json<SubmitSignatureRequest>, JsonRejection>,
) -> ApiResult<SubmitSignatureResponse> {
    let Json(req) = payload.map_err(json_rejection)?;
    let hash = digest_from_hex(&req.hash)
        .ok_or_else(|| bad_request("hash must be 32 hex-encoded bytes".to_string()))?;
    let signature = hex::decode(req.signature.trim_start_matches("0x"))
        .map_err(|e| bad_request(format!("Invalid signature hex: {}", e)))?;

    // Authorize, execute and persist under one write guard
    let mut vault = state.vault.write().await;
    let executed = commit(&state.storage, &mut vault, |vault| {
        vault.submit_signature(id, &hash, &signature)
    })?;

    let record = vault
        .get_transaction(id)
        .ok_or_else(|| vault_error(VaultError::UnknownTransaction(id)))?;

    Ok(Json(SubmitSignatureResponse {
        txn_id: id,
        executed,
        transaction: transaction_info(&vault, id, record),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use crate::multisig::Asset;
    use crate::storage::StorageConfig;

    fn test_state(dir: &tempfile::TempDir) -> ApiState {
        let storage = Storage::new(StorageConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        })
        .unwrap();

        let mut book = AssetBook::new();
        book.deposit(&Asset::Native, 10_000).unwrap();

        ApiState {
            vault: Arc::new(RwLock::new(Vault::new("SP000.multisig", book))),
            storage: Arc::new(storage),
        }
    }

    async fn init(state: &ApiState, keys: &[KeyPair], threshold: u8) {
        initialize_vault(
            State(state.clone()),
            Ok(Json(InitializeRequest {
                signers: keys.iter().map(|k| k.address().to_string()).collect(),
                threshold,
            })),
        )
        .await
        .unwrap();
    }

    async fn propose(
        state: &ApiState,
        proposer: &KeyPair,
        amount: u128,
    ) -> ApiResult<ProposeResponse> {
        propose_transaction(
            State(state.clone()),
            Ok(Json(ProposeTransactionRequest {
                proposer: proposer.address().to_string(),
                kind: TransactionKind::NativeTransfer,
                amount,
                recipient: "1Recipient".to_string(),
                token: None,
            })),
        )
        .await
    }

    async fn sign_and_submit(
        state: &ApiState,
        id: u64,
        key: &KeyPair,
    ) -> ApiResult<SubmitSignatureResponse> {
        let Json(hash) = get_signing_hash(
            State(state.clone()),
            Path(id),
            Query(SigningHashQuery {
                caller: key.address().to_string(),
            }),
        )
        .await
        .unwrap();

        let digest = digest_from_hex(&hash.hash).unwrap();
        let signature = key.sign_recoverable(&digest).unwrap();

        submit_signature(
            State(state.clone()),
            Path(id),
            Ok(Json(SubmitSignatureRequest {
                hash: hash.hash,
                signature: hex::encode(signature),
            })),
        )
        .await
    }

    #[tokio::test]
    async fn test_health_check() {
        assert_eq!(health_check().await, "OK");
    }

    #[tokio::test]
    async fn test_full_flow() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let keys: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
        init(&state, &keys, 2).await;

        let Json(info) = get_vault_info(State(state.clone())).await;
        assert!(info.initialized);
        assert_eq!(info.description, "2-of-3");

        let Json(proposed) = propose(&state, &keys[0], 1000).await.unwrap();
        assert_eq!(proposed.txn_id, 0);

        let Json(first) = sign_and_submit(&state, 0, &keys[0]).await.unwrap();
        assert!(!first.executed);
        assert_eq!(first.transaction.signatures_collected, 1);

        let Json(second) = sign_and_submit(&state, 0, &keys[1]).await.unwrap();
        assert!(second.executed);
        assert_eq!(second.transaction.status, "Executed");

        let (status, Json(err)) = sign_and_submit(&state, 0, &keys[2]).await.unwrap_err();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(err.code, Some(11));

        // Every mutation was persisted
        assert!(state.storage.exists());
        let (stored, book) = state.storage.load().unwrap();
        assert!(stored.ledger.is_executed(0));
        assert_eq!(book.balance(&Asset::Native), 9_000);
    }

    #[tokio::test]
    async fn test_errors_carry_codes() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let keys: Vec<KeyPair> = (0..2).map(|_| KeyPair::generate()).collect();
        init(&state, &keys, 2).await;

        let outsider = KeyPair::generate();
        let (status, Json(err)) = propose(&state, &outsider, 10).await.unwrap_err();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(err.code, Some(6));

        let (status, Json(err)) = propose(&state, &keys[0], 0).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, Some(7));

        let (status, _) = get_transaction(State(state.clone()), Path(42))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);

        propose(&state, &keys[0], 10).await.unwrap();
        let Json(hash) = get_signing_hash(
            State(state.clone()),
            Path(0),
            Query(SigningHashQuery {
                caller: keys[0].address().to_string(),
            }),
        )
        .await
        .unwrap();

        let (status, Json(err)) = submit_signature(
            State(state.clone()),
            Path(0),
            Ok(Json(SubmitSignatureRequest {
                hash: hash.hash,
                signature: "00".repeat(65),
            })),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(err.code, Some(12));

        let (status, Json(err)) = submit_signature(
            State(state.clone()),
            Path(0),
            Ok(Json(SubmitSignatureRequest {
                hash: "abcd".to_string(),
                signature: "00".repeat(65),
            })),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, None);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_vault_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let keys: Vec<KeyPair> = (0..2).map(|_| KeyPair::generate()).collect();
        init(&state, &keys, 2).await;
        propose(&state, &keys[0], 1000).await.unwrap();
        sign_and_submit(&state, 0, &keys[0]).await.unwrap();

        // A directory where the temp file goes makes the next save fail
        let blocker = dir.path().join("vault.tmp");
        std::fs::create_dir(&blocker).unwrap();

        let (status, Json(err)) = sign_and_submit(&state, 0, &keys[1]).await.unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, None);

        {
            let vault = state.vault.read().await;
            assert!(!vault.is_executed(0));
            assert_eq!(vault.authorizations(0).len(), 1);
            assert_eq!(vault.effect().balance(&Asset::Native), 10_000);
        }
        let (stored, book) = state.storage.load().unwrap();
        assert!(!stored.ledger.is_executed(0));
        assert_eq!(book.balance(&Asset::Native), 10_000);

        // Same signature goes through once storage is writable again
        std::fs::remove_dir(&blocker).unwrap();
        let Json(done) = sign_and_submit(&state, 0, &keys[1]).await.unwrap();
        assert!(done.executed);
        assert_eq!(state.storage.load().unwrap().1.balance(&Asset::Native), 9_000);
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_shape() {
        use axum::body::Body;
        use axum::extract::FromRequest;
        use axum::http::Request;

        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let request = Request::builder()
            .method("POST")
            .uri("/api/vault/init")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"signers":["1Alice"],"threshold":300}"#))
            .unwrap();
        let payload = Json::<InitializeRequest>::from_request(request, &()).await;

        let (status, Json(err)) = initialize_vault(State(state.clone()), payload)
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code, None);
        assert!(!err.error.is_empty());
        assert!(!state.vault.read().await.is_initialized());
    }

    #[tokio::test]
    async fn test_list_transactions() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let keys: Vec<KeyPair> = (0..2).map(|_| KeyPair::generate()).collect();
        init(&state, &keys, 2).await;

        propose(&state, &keys[0], 10).await.unwrap();
        propose(&state, &keys[1], 20).await.unwrap();

        let Json(list) = list_transactions(State(state.clone())).await;
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].amount, 20);
        assert_eq!(list[1].status, "Proposed");
        assert_eq!(list[1].signatures_required, 2);
    }
}
