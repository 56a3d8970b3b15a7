pub use query_records::table as query_records_db;

diesel::table! {
    /// 区块表
    blocks (id) {
        id -> Int8,
        /// 区块号（唯一）
        block_number -> Int8,
        block_hash -> Varchar,
        /// 区块时间
        timestamp -> Timestamp,
        transactions_count -> Int4,
        gas_used -> Int8,
        gas_limit -> Int8,
        /// 出块地址
        miner -> Varchar,
        created_at -> Timestamp,
    }
}

diesel::table! {
    /// 交易表
    transactions (id) {
        id -> Int8,
        /// 交易哈希（唯一）
        tx_hash -> Varchar,
        block_number -> Int8,
        from_address -> Varchar,
        /// 合约创建交易为空
        to_address -> Nullable<Varchar>,
        /// ETH 单位
        value -> Numeric,
        gas_limit -> Int8,
        /// ETH 单位
        gas_price -> Numeric,
        gas_used -> Nullable<Int8>,
        /// eth_transfer / erc20_transfer / contract_call
        tx_type -> Varchar,
        /// success / failed
        status -> Varchar,
        created_at -> Timestamp,
    }
}

diesel::table! {
    /// ERC20 转账表（tx_hash 非唯一）
    erc20_transfers (id) {
        id -> Int8,
        tx_hash -> Varchar,
        from_address -> Varchar,
        to_address -> Varchar,
        contract_address -> Varchar,
        /// 原始整数单位
        amount -> Numeric,
        created_at -> Timestamp,
    }
}

diesel::table! {
    /// 查询记录表
    query_records (id) {
        id -> Int8,
        address -> Nullable<Varchar>,
        query_type -> Varchar,
        query_param -> Varchar,
        created_at -> Timestamp,
    }
}
