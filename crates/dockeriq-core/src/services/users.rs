use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait, TryIntoModel,
};
use serde::Deserialize;
use validator::Validate;

use crate::auth::AuthService;
use crate::error::ApiError;
use crate::models::user::{self, Entity as User, Role, UserResponse};
use crate::models::user_details::{self, Entity as UserDetails};

fn default_active() -> bool {
    true
}

/// Payload for `POST /users`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,

    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,

    pub role: Role,

    #[serde(default = "default_active")]
    pub active: bool,

    #[validate(length(min = 1, max = 100))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100))]
    pub last_name: String,

    pub address: Option<String>,
    pub phone_number: Option<String>,
}

/// Payload for `PUT /users/{email}`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDetails {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100))]
    pub last_name: String,

    pub address: Option<String>,
    pub phone_number: Option<String>,
}

/// Identity and profile CRUD.
#[derive(Clone)]
pub struct UserService {
    db: DatabaseConnection,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        UserService { db }
    }

    pub async fn count(&self) -> Result<u64, ApiError> {
        Ok(User::find().count(&self.db).await?)
    }

    pub async fn list(&self) -> Result<Vec<UserResponse>, ApiError> {
        let users = User::find()
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?;
        let mut details = UserDetails::find().all(&self.db).await?;

        Ok(users
            .into_iter()
            .map(|u| {
                let profile = details
                    .iter()
                    .position(|d| d.email == u.email)
                    .map(|idx| details.swap_remove(idx).into());
                UserResponse {
                    details: profile,
                    ..UserResponse::from(u)
                }
            })
            .collect())
    }

    pub async fn get(&self, email: &str) -> Result<UserResponse, ApiError> {
        let identity = self.find(email).await?;
        let details = UserDetails::find()
            .filter(user_details::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(UserResponse {
            details: details.map(Into::into),
            ..UserResponse::from(identity)
        })
    }

    pub async fn create(
        &self,
        payload: CreateUser,
        created_by: Option<&str>,
    ) -> Result<UserResponse, ApiError> {
        payload.validate()?;

        let email = payload.email.trim().to_string();
        if User::find()
            .filter(user::Column::Email.eq(&email))
            .one(&self.db)
            .await?
            .is_some()
        {
            return Err(ApiError::Conflict(format!(
                "User already exists with email: {}",
                email
            )));
        }

        let now = Utc::now().naive_utc();
        let mut identity = user::Model {
            id: 0,
            email: email.clone(),
            password_hash: payload.password,
            role: payload.role.as_str().to_string(),
            active: payload.active,
            password_reset: false,
            created_by: created_by.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        AuthService::encode_password(&mut identity)?;

        let mut record = identity.into_active_model();
        record.id = NotSet;

        let details = user_details::ActiveModel {
            email: Set(email.clone()),
            first_name: Set(payload.first_name),
            last_name: Set(payload.last_name),
            address: Set(payload.address),
            phone_number: Set(payload.phone_number),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let txn = self.db.begin().await?;
        let saved = record.insert(&txn).await?;
        let saved_details = details.insert(&txn).await?;
        txn.commit().await?;

        tracing::info!(email = %saved.email, role = %saved.role, "user created");

        Ok(UserResponse {
            details: Some(saved_details.into()),
            ..UserResponse::from(saved)
        })
    }

    pub async fn update_details(
        &self,
        email: &str,
        payload: UpdateDetails,
    ) -> Result<UserResponse, ApiError> {
        payload.validate()?;
        let identity = self.find(email).await?;
        let now = Utc::now().naive_utc();

        let existing = UserDetails::find()
            .filter(user_details::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        let mut details = match existing {
            Some(d) => d.into_active_model(),
            None => user_details::ActiveModel {
                email: Set(email.to_string()),
                created_at: Set(now),
                ..Default::default()
            },
        };
        details.first_name = Set(payload.first_name);
        details.last_name = Set(payload.last_name);
        details.address = Set(payload.address);
        details.phone_number = Set(payload.phone_number);
        details.updated_at = Set(now);
        let details = details.save(&self.db).await?.try_into_model()?;

        Ok(UserResponse {
            details: Some(details.into()),
            ..UserResponse::from(identity)
        })
    }

    /// Change the stored role. Tokens issued under the old role stop working.
    pub async fn change_role(&self, email: &str, role: Role) -> Result<UserResponse, ApiError> {
        let identity = self.find(email).await?;
        let previous = identity.role.clone();

        let mut record = identity.into_active_model();
        record.role = Set(role.as_str().to_string());
        record.updated_at = Set(Utc::now().naive_utc());
        let saved = record.update(&self.db).await?;

        tracing::info!(%email, from = %previous, to = %saved.role, "role changed");
        self.get(&saved.email).await
    }

    pub async fn set_active(&self, email: &str, active: bool) -> Result<UserResponse, ApiError> {
        let identity = self.find(email).await?;

        let mut record = identity.into_active_model();
        record.active = Set(active);
        record.updated_at = Set(Utc::now().naive_utc());
        let saved = record.update(&self.db).await?;

        tracing::info!(%email, active, "account status changed");
        self.get(&saved.email).await
    }

    pub async fn delete(&self, email: &str) -> Result<(), ApiError> {
        let identity = self.find(email).await?;

        let txn = self.db.begin().await?;
        UserDetails::delete_many()
            .filter(user_details::Column::Email.eq(email))
            .exec(&txn)
            .await?;
        User::delete_by_id(identity.id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(%email, "user deleted");
        Ok(())
    }

    async fn find(&self, email: &str) -> Result<user::Model, ApiError> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User not found with email: {}", email)))
    }
}
