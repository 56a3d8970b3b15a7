use crate::errors::error::AppError;
use ethers_core::types::{Address, Transaction, U256};

/// 签名时使用的 chain id：
/// 显式声明且非零的 chain_id 优先，否则 v >= 35 时按 EIP-155 从 v 推导，其余为 homestead 签名
fn signing_chain_id(tx: &Transaction) -> Option<U256> {
    match tx.chain_id {
        Some(id) if !id.is_zero() => Some(id),
        _ => {
            let v = tx.v.as_u64();
            (v >= 35).then(|| U256::from((v - 35) / 2))
        }
    }
}

/// 从交易签名恢复发送方地址，不信任节点返回的 from 字段。
/// 只支持 legacy、EIP-2930 与 EIP-1559；其他类型的签名载荷无法还原，直接报错
pub fn recover_sender(tx: &Transaction) -> Result<Address, AppError> {
    let tx_type = tx.transaction_type.map(|t| t.as_u64());
    if !matches!(tx_type, None | Some(0..=2)) {
        return Err(AppError::SignatureRecovery(format!(
            "{:#x}: 不支持的交易类型 {:?}",
            tx.hash, tx_type
        )));
    }
    let mut unsigned = tx.clone();
    unsigned.chain_id = signing_chain_id(tx);
    unsigned
        .recover_from()
        .map_err(|e| AppError::SignatureRecovery(format!("{:#x}: {}", tx.hash, e)))
}
