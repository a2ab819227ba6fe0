// BoundedQueue - 固定容量のブロッキングFIFO
// 1つのProducerと複数のConsumerで共有される

use crate::core::{FarmError, FarmResult};
use std::collections::VecDeque;
use tokio::sync::{Mutex, Semaphore};

/// 固定容量のブロッキングキュー
///
/// `push`は満杯の間、`pop`は空の間待機する。
/// 空きスロット数と格納済み要素数を2つのセマフォで管理し、
/// 要素本体への排他は内部のMutexで行う。tokioのセマフォは待機順に
/// 許可を渡すため、待機中の呼び出し側も到着順に進む。
pub struct BoundedQueue<T> {
    items: Mutex<VecDeque<T>>,
    free_slots: Semaphore,
    filled: Semaphore,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// 新しいキューを作成（容量0はエラー）
    pub fn new(capacity: usize) -> FarmResult<Self> {
        if capacity == 0 {
            return Err(FarmError::validation(
                "queue_depth",
                "キュー容量は1以上である必要があります",
            ));
        }
        if capacity > Semaphore::MAX_PERMITS {
            return Err(FarmError::validation(
                "queue_depth",
                format!("キュー容量が上限({})を超えています", Semaphore::MAX_PERMITS),
            ));
        }

        Ok(Self {
            // 上限はセマフォが保証するため、格納領域は必要な分だけ確保する
            items: Mutex::new(VecDeque::new()),
            free_slots: Semaphore::new(capacity),
            filled: Semaphore::new(0),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 現在の格納数
    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }

    /// 末尾に追加する。満杯の間は待機する。
    pub async fn push(&self, item: T) -> FarmResult<()> {
        let slot = self
            .free_slots
            .acquire()
            .await
            .map_err(|_| FarmError::QueueClosedError)?;
        slot.forget();

        self.items.lock().await.push_back(item);
        self.filled.add_permits(1);
        Ok(())
    }

    /// 先頭を取り出す。空の間は待機する。
    pub async fn pop(&self) -> FarmResult<T> {
        let ticket = self
            .filled
            .acquire()
            .await
            .map_err(|_| FarmError::QueueClosedError)?;
        ticket.forget();

        let item = self.items.lock().await.pop_front();
        match item {
            Some(item) => {
                self.free_slots.add_permits(1);
                Ok(item)
            }
            // filledの許可数と格納数は常に一致する
            None => Err(FarmError::internal(anyhow::anyhow!(
                "キューの許可数と格納数が一致しません"
            ))),
        }
    }

    /// キューを閉じ、待機中および以後の`push`/`pop`を`QueueClosedError`で失敗させる
    ///
    /// 異常停止時にのみ使う。格納済みの要素は`destroy_with`で回収する。
    pub fn close(&self) {
        self.free_slots.close();
        self.filled.close();
    }

    pub fn is_closed(&self) -> bool {
        self.filled.is_closed()
    }

    /// キューを破棄し、残っている要素それぞれに`cleanup`を適用する
    ///
    /// 戻り値は残っていた要素数。正常終了時は空であることを呼び出し側が保証する。
    pub fn destroy_with<F>(self, cleanup: F) -> usize
    where
        F: FnMut(T),
    {
        let remaining = self.items.into_inner();
        let count = remaining.len();
        remaining.into_iter().for_each(cleanup);
        count
    }
}
