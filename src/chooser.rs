// src/chooser.rs

use rand::Rng;

/// 在若干等价候选项中挑选一个（服务器前缀、存储镜像、User-Agent）。
///
/// 生产环境使用 [`RandomChooser`]，测试中可注入 [`FixedChooser`] 以获得确定结果。
pub trait Chooser: Send + Sync {
    /// 返回 `0..len` 范围内的下标。调用方保证 `len > 0`。
    fn choose_index(&self, len: usize) -> usize;
}

/// 每次调用都从线程本地随机源取值
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomChooser;

impl Chooser for RandomChooser {
    fn choose_index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// 总是返回固定下标（越界时取最后一个）
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedChooser(pub usize);

impl Chooser for FixedChooser {
    fn choose_index(&self, len: usize) -> usize {
        self.0.min(len.saturating_sub(1))
    }
}

pub fn choose<'a, T>(chooser: &dyn Chooser, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(chooser.choose_index(items.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose_on_empty_slice() {
        let empty: [&str; 0] = [];
        assert_eq!(choose(&RandomChooser, &empty), None);
    }

    #[test]
    fn test_fixed_chooser_clamps_index() {
        let items = ["a", "b", "c"];
        assert_eq!(choose(&FixedChooser(1), &items), Some(&"b"));
        assert_eq!(choose(&FixedChooser(9), &items), Some(&"c"));
    }

    #[test]
    fn test_random_chooser_stays_in_range() {
        let items = [1, 2, 3, 4];
        for _ in 0..100 {
            assert!(choose(&RandomChooser, &items).is_some());
        }
    }
}
