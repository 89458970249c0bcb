use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::features::pages::dtos::normalize_url;
use crate::shared::constants::{ALLOWED_PICTURE_TYPES, MAX_PICTURE_SIZE};
use crate::shared::types::FieldErrors;
use crate::shared::validation::USERNAME_REGEX;

/// bcrypt only looks at the first 72 bytes of a password
const MAX_PASSWORD_BYTES: usize = 72;

/// Account half of the registration form
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserForm {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// Profile half of the registration form
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserProfileForm {
    pub website: String,
}

/// A file received in the `picture` field
#[derive(Debug, Clone)]
pub struct UploadedPicture {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadedPicture {
    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => "bin",
        }
    }
}

#[derive(Debug, Clone, Validate)]
pub struct NewUser {
    #[validate(length(
        min = 1,
        max = 150,
        message = "Required. 150 characters or fewer."
    ))]
    #[validate(regex(
        path = *USERNAME_REGEX,
        message = "Letters, digits and @/./+/-/_ only."
    ))]
    pub username: String,

    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,

    #[validate(length(min = 1, message = "Please enter a password."))]
    pub password: String,
}

#[derive(Debug, Clone, Validate)]
pub struct NewProfile {
    #[validate(length(max = 200, message = "The website URL must be at most 200 characters."))]
    #[validate(url(message = "Enter a valid URL."))]
    pub website: Option<String>,

    pub picture: Option<UploadedPicture>,
}

/// Both halves of a registration, validated
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: NewUser,
    pub profile: NewProfile,
}

/// Everything submitted to the registration page
#[derive(Debug, Clone, Default)]
pub struct RegisterForms {
    pub user: UserForm,
    pub profile: UserProfileForm,
    pub picture: Option<UploadedPicture>,
}

impl UserForm {
    pub fn clean(&self) -> Result<NewUser, FieldErrors> {
        let email = self.email.trim();
        let user = NewUser {
            username: self.username.trim().to_string(),
            email: (!email.is_empty()).then(|| email.to_string()),
            password: self.password.clone(),
        };

        let mut errors = match user.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => e.into(),
        };
        if user.password.len() > MAX_PASSWORD_BYTES {
            errors.add("password", "The password must be at most 72 bytes long.");
        }

        errors.into_result(user)
    }
}

impl UserProfileForm {
    pub fn clean(&self, picture: Option<UploadedPicture>) -> Result<NewProfile, FieldErrors> {
        let website = normalize_url(&self.website);
        let profile = NewProfile {
            website: (!website.is_empty()).then_some(website),
            picture,
        };

        let mut errors = match profile.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => e.into(),
        };
        if let Some(picture) = &profile.picture {
            if !ALLOWED_PICTURE_TYPES.contains(&picture.content_type.as_str()) {
                errors.add(
                    "picture",
                    format!(
                        "Unsupported image type '{}'. Allowed: {}",
                        picture.content_type,
                        ALLOWED_PICTURE_TYPES.join(", ")
                    ),
                );
            }
            if picture.data.len() > MAX_PICTURE_SIZE {
                errors.add("picture", "The picture must be at most 5MB.");
            }
        }

        errors.into_result(profile)
    }
}

impl RegisterForms {
    /// Validate both forms; any error in either means nothing may be saved
    pub fn clean(&self) -> Result<Registration, FieldErrors> {
        match (self.user.clean(), self.profile.clean(self.picture.clone())) {
            (Ok(user), Ok(profile)) => Ok(Registration { user, profile }),
            (user, profile) => {
                let mut errors = FieldErrors::new();
                if let Err(e) = user {
                    errors.merge(e);
                }
                if let Err(e) = profile {
                    errors.merge(e);
                }
                Err(errors)
            }
        }
    }
}

/// Submitted login form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forms(username: &str, website: &str) -> RegisterForms {
        RegisterForms {
            user: UserForm {
                username: username.to_string(),
                email: "".to_string(),
                password: "tango".to_string(),
            },
            profile: UserProfileForm {
                website: website.to_string(),
            },
            picture: None,
        }
    }

    fn picture(content_type: &str, size: usize) -> UploadedPicture {
        UploadedPicture {
            file_name: "me.png".to_string(),
            content_type: content_type.to_string(),
            data: vec![0; size],
        }
    }

    #[test]
    fn test_valid_registration() {
        let registration = forms("leifos", "www.tangowithdjango.com").clean().unwrap();
        assert_eq!(registration.user.username, "leifos");
        assert_eq!(registration.user.email, None);
        assert_eq!(
            registration.profile.website.as_deref(),
            Some("http://www.tangowithdjango.com")
        );
    }

    #[test]
    fn test_blank_website_is_allowed() {
        let registration = forms("leifos", "  ").clean().unwrap();
        assert_eq!(registration.profile.website, None);
    }

    #[test]
    fn test_invalid_profile_fails_whole_registration() {
        let errors = forms("leifos", "http://exa mple.com").clean().unwrap_err();
        assert!(errors.has("website"));
        assert!(!errors.has("username"));
    }

    #[test]
    fn test_errors_from_both_forms_are_reported() {
        let errors = forms("bad name!", "http://exa mple.com").clean().unwrap_err();
        assert!(errors.has("username"));
        assert!(errors.has("website"));
    }

    #[test]
    fn test_user_form_rules() {
        let mut form = UserForm {
            username: "".to_string(),
            email: "not-an-email".to_string(),
            password: "".to_string(),
        };
        let errors = form.clean().unwrap_err();
        assert!(errors.has("username"));
        assert!(errors.has("email"));
        assert!(errors.has("password"));

        form.username = "a".repeat(151);
        assert!(form.clean().unwrap_err().has("username"));

        form.username = "leifos".to_string();
        form.email = "leif@example.com".to_string();
        form.password = "p".repeat(73);
        assert!(form.clean().unwrap_err().has("password"));

        form.password = "p".repeat(72);
        assert!(form.clean().is_ok());
    }

    #[test]
    fn test_picture_rules() {
        let profile = UserProfileForm::default();

        assert!(profile.clean(Some(picture("image/png", 1024))).is_ok());

        let errors = profile
            .clean(Some(picture("application/pdf", 1024)))
            .unwrap_err();
        assert!(errors.has("picture"));

        let errors = profile
            .clean(Some(picture("image/jpeg", MAX_PICTURE_SIZE + 1)))
            .unwrap_err();
        assert!(errors.has("picture"));
    }

    #[test]
    fn test_password_is_never_serialized() {
        let form = UserForm {
            username: "leifos".to_string(),
            email: String::new(),
            password: "secret".to_string(),
        };
        let json = serde_json::to_string(&form).unwrap();
        assert!(!json.contains("secret"));
    }
}
