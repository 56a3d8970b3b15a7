use crate::errors::error::AppError;
use crate::models::{ERC20_TRANSFER_TOPIC, TokenTransfer, TxCategory};
use crate::utils::address_to_string;
use crate::utils::decode::{decode_topic_address, decode_u256_word};
use crate::log_warn;
use chrono::NaiveDateTime;
use ethers_core::types::{Log, Transaction, TransactionReceipt};

/// 交易分类：无 input 为 ETH 转账；回执中出现 Transfer 事件为 ERC20 转账；其余为合约调用
pub fn classify_transaction(tx: &Transaction, receipt: &TransactionReceipt) -> TxCategory {
    if tx.input.is_empty() {
        return TxCategory::EthTransfer;
    }
    let has_transfer = receipt
        .logs
        .iter()
        .any(|log| log.topics.first() == Some(&*ERC20_TRANSFER_TOPIC));
    if has_transfer {
        TxCategory::Erc20Transfer
    } else {
        TxCategory::ContractCall
    }
}

fn is_erc20_transfer(log: &Log) -> bool {
    // ERC721 的 Transfer 签名相同，但 tokenId 也是 indexed，topics 为 4 个
    log.topics.len() == 3 && log.topics[0] == *ERC20_TRANSFER_TOPIC
}

fn decode_transfer(tx_hash: &str, log: &Log, created_at: NaiveDateTime) -> Result<TokenTransfer, AppError> {
    let amount = decode_u256_word(&log.data, 0)?;
    Ok(TokenTransfer {
        tx_hash: tx_hash.to_string(),
        from_address: address_to_string(decode_topic_address(&log.topics[1])),
        to_address: address_to_string(decode_topic_address(&log.topics[2])),
        contract_address: address_to_string(log.address),
        amount: amount.to_string(),
        created_at,
    })
}

/// 从回执日志中提取 ERC20 转账；单条日志解码失败只记录告警，不影响其它日志
pub fn extract_transfers(tx_hash: &str, logs: &[Log], created_at: NaiveDateTime) -> Vec<TokenTransfer> {
    logs.iter()
        .filter(|log| is_erc20_transfer(log))
        .filter_map(|log| match decode_transfer(tx_hash, log, created_at) {
            Ok(transfer) => Some(transfer),
            Err(e) => {
                log_warn!(
                    "交易 {} 的 Transfer 日志 (log_index={:?}) 解码失败，跳过: {}",
                    tx_hash,
                    log.log_index,
                    e
                );
                None
            }
        })
        .collect()
}
