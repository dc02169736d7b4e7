//! 身份解析：把客户给出的自由文本标识符解析为规范的客户编号
//!
//! 按形状分类：全数字为客户编号（直接接受，不查库）；以 `+` 开头为电话；含 `@` 为邮箱；
//! 其余（包括空串）视为无法识别，不发起查询。查无此人返回 None 而不是错误，由调用方重新追问。

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::StoreError;
use crate::db::Database;

/// 按形状分类后的标识符
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    CustomerId(u64),
    Phone(String),
    Email(String),
    Unrecognized,
}

impl Identifier {
    pub fn classify(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Identifier::Unrecognized;
        }
        if trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return match trimmed.parse::<u64>() {
                Ok(id) => Identifier::CustomerId(id),
                Err(_) => {
                    tracing::warn!(identifier = %trimmed, "numeric identifier out of range");
                    Identifier::Unrecognized
                }
            };
        }
        if trimmed.starts_with('+') {
            return Identifier::Phone(trimmed.to_string());
        }
        if trimmed.contains('@') {
            return Identifier::Email(trimmed.to_string());
        }
        Identifier::Unrecognized
    }
}

/// 客户目录：按电话或邮箱精确匹配
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn find_by_phone(&self, phone: &str) -> Result<Option<u64>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<u64>, StoreError>;
}

/// 基于演示商店库 Customer 表的目录
pub struct SqliteCustomerDirectory {
    db: Arc<Database>,
}

impl SqliteCustomerDirectory {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn lookup(&self, sql: &str, value: &str) -> Result<Option<u64>, StoreError> {
        let id = self.db.query_id(sql, rusqlite::params![value])?;
        Ok(id.and_then(|id| u64::try_from(id).ok()))
    }
}

#[async_trait]
impl CustomerDirectory for SqliteCustomerDirectory {
    async fn find_by_phone(&self, phone: &str) -> Result<Option<u64>, StoreError> {
        self.lookup("SELECT CustomerId FROM Customer WHERE Phone = ?1", phone)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<u64>, StoreError> {
        self.lookup("SELECT CustomerId FROM Customer WHERE Email = ?1", email)
    }
}

/// 标识符解析器：单次尝试，不重试
#[derive(Clone)]
pub struct IdentityResolver {
    directory: Arc<dyn CustomerDirectory>,
}

impl IdentityResolver {
    pub fn new(directory: Arc<dyn CustomerDirectory>) -> Self {
        Self { directory }
    }

    pub async fn resolve(&self, raw: &str) -> Result<Option<u64>, StoreError> {
        let identifier = Identifier::classify(raw);
        let resolved = match &identifier {
            Identifier::CustomerId(id) => Some(*id),
            Identifier::Phone(phone) => self.directory.find_by_phone(phone).await?,
            Identifier::Email(email) => self.directory.find_by_email(email).await?,
            Identifier::Unrecognized => None,
        };
        tracing::info!(identifier = ?identifier, resolved = ?resolved, "identity lookup");
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 只认识一个邮箱的目录，记录查询次数
    #[derive(Default)]
    struct CountingDirectory {
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl CustomerDirectory for CountingDirectory {
        async fn find_by_phone(&self, _phone: &str) -> Result<Option<u64>, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<u64>, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok((email == "joe@gmail.com").then_some(60))
        }
    }

    #[test]
    fn test_classify_by_shape() {
        assert_eq!(Identifier::classify(" 007 "), Identifier::CustomerId(7));
        assert_eq!(
            Identifier::classify("+1 (555) 010-0060"),
            Identifier::Phone("+1 (555) 010-0060".to_string())
        );
        assert_eq!(
            Identifier::classify("joe@gmail.com"),
            Identifier::Email("joe@gmail.com".to_string())
        );
        assert_eq!(Identifier::classify(""), Identifier::Unrecognized);
        assert_eq!(Identifier::classify("joe"), Identifier::Unrecognized);
        assert_eq!(Identifier::classify("99999999999999999999999"), Identifier::Unrecognized);
    }

    #[tokio::test]
    async fn test_numeric_ids_skip_the_directory() {
        let directory = Arc::new(CountingDirectory::default());
        let resolver = IdentityResolver::new(directory.clone());
        assert_eq!(resolver.resolve("42").await.unwrap(), Some(42));
        assert_eq!(resolver.resolve("").await.unwrap(), None);
        assert_eq!(directory.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_phone_is_absent_not_error() {
        let directory = Arc::new(CountingDirectory::default());
        let resolver = IdentityResolver::new(directory.clone());
        assert_eq!(resolver.resolve("+15551234567").await.unwrap(), None);
        assert_eq!(resolver.resolve("joe@gmail.com").await.unwrap(), Some(60));
        assert_eq!(directory.lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_sqlite_directory_matches_seed_data() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let resolver = IdentityResolver::new(Arc::new(SqliteCustomerDirectory::new(db)));
        assert_eq!(resolver.resolve("joe@gmail.com").await.unwrap(), Some(60));
        assert_eq!(resolver.resolve("+1 (555) 010-0060").await.unwrap(), Some(60));
        assert_eq!(resolver.resolve("+15551234567").await.unwrap(), None);
    }
}
