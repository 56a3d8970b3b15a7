use super::block_scanner::{BlockScanner, ScanOutcome};
use crate::{log_error, log_info};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// 扫描生命周期：idle → running → completed | cancelled | failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScanStatus {
    Idle,
    Running { run_id: u64, from_block: u64 },
    Finished { run_id: u64, outcome: ScanOutcome },
    Failed { run_id: u64, error: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanTicket {
    pub run_id: u64,
    pub from_block: u64,
}

/// 把扫描放到后台任务执行，请求方只拿到回执
pub struct ScanService {
    scanner: Arc<BlockScanner>,
    status_tx: watch::Sender<ScanStatus>,
    next_run_id: AtomicU64,
}

impl ScanService {
    pub fn new(scanner: Arc<BlockScanner>) -> Self {
        let (status_tx, _) = watch::channel(ScanStatus::Idle);
        Self {
            scanner,
            status_tx,
            next_run_id: AtomicU64::new(1),
        }
    }

    pub fn submit(&self, from_block: u64) -> ScanTicket {
        let run_id = self.next_run_id.fetch_add(1, Ordering::SeqCst);
        let ticket = ScanTicket { run_id, from_block };
        self.status_tx
            .send_replace(ScanStatus::Running { run_id, from_block });

        // 取消标记在返回回执前就位，紧随其后的 stop() 不会落空
        let cancel = self.scanner.begin_run();
        let scanner = self.scanner.clone();
        let status_tx = self.status_tx.clone();
        tokio::spawn(async move {
            let status = match scanner.scan_range(from_block, &cancel).await {
                Ok(outcome) => {
                    log_info!("扫描任务 #{} 结束: {:?}", run_id, outcome);
                    ScanStatus::Finished { run_id, outcome }
                }
                Err(e) => {
                    log_error!("扫描任务 #{} 失败: {}", run_id, e);
                    ScanStatus::Failed {
                        run_id,
                        error: e.to_string(),
                    }
                }
            };
            // 只有最近一次提交的任务才能覆盖状态，避免旧任务结束时把新任务的 Running 冲掉
            status_tx.send_if_modified(|current| {
                let is_latest = match current {
                    ScanStatus::Running { run_id: id, .. } => *id == run_id,
                    _ => false,
                };
                if is_latest {
                    *current = status;
                }
                is_latest
            });
        });
        ticket
    }

    pub fn stop(&self) {
        self.scanner.stop();
    }

    pub fn status(&self) -> ScanStatus {
        self.status_tx.borrow().clone()
    }

    #[cfg(test)]
    fn subscribe(&self) -> watch::Receiver<ScanStatus> {
        self.status_tx.subscribe()
    }
}
