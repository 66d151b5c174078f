use super::{resolve_school, with_cookie_rollback, LoginError};
use crate::{
    auth::init::build_session,
    client::{LoginMethod, SchoolIdentifier},
    Client,
};

pub(crate) async fn login_with_token(
    client: &Client,
    token: &str,
    school: Option<&SchoolIdentifier>,
    method: LoginMethod,
) -> Result<(), LoginError> {
    let http = client.internal.http();

    let session = with_cookie_rollback(http, async {
        let school_id = match school {
            Some(school) => Some(resolve_school(http, school).await?),
            None => None,
        };
        Ok::<_, LoginError>(build_session(http, Some(token.to_owned()), school_id).await?)
    })
    .await?;

    client.internal.commit_session(session, method);
    Ok(())
}
