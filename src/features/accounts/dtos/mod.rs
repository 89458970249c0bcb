mod account_dto;

pub use account_dto::{
    LoginForm, LoginQuery, NewProfile, NewUser, RegisterForms, Registration, UploadedPicture,
    UserForm, UserProfileForm,
};
