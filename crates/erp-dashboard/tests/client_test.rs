use erp_dashboard::clients::{DepartmentClient, DepartmentError, ProductClient, ProductError};
use erp_dashboard::model::{
    Department, DepartmentCreate, DepartmentId, Product, ProductCreate, ProductId,
};
use query_framework::mock::{create_mock_client, expect_create, expect_delete, expect_update};
use query_framework::{MutationOutcome, QueryError, ResourceApi};

fn finance() -> Department {
    Department {
        id: DepartmentId(1),
        name: "Finance".to_string(),
        description: None,
        employee_count: 0,
        is_active: true,
    }
}

/// Client logic against a scripted actor: the request is answered by hand.
#[tokio::test]
async fn test_create_department_returns_the_stored_record() {
    let (generic_client, mut receiver) = create_mock_client::<Department>(10);
    let client = DepartmentClient::new(generic_client);

    let task = tokio::spawn(async move {
        client
            .create_department(DepartmentCreate::named("Finance"))
            .await
    });

    let (params, respond_to) = expect_create(&mut receiver).await.unwrap();
    assert_eq!(params.name, "Finance");
    respond_to
        .send(Ok(MutationOutcome {
            message: "Created successfully".to_string(),
            data: Some(finance()),
        }))
        .unwrap();

    assert_eq!(task.await.unwrap(), Ok(finance()));
}

#[tokio::test]
async fn test_blank_department_name_is_rejected_before_sending() {
    let (generic_client, mut receiver) = create_mock_client::<Department>(10);
    let client = DepartmentClient::new(generic_client);

    let result = client
        .create_department(DepartmentCreate::named("   "))
        .await;

    assert_eq!(result, Err(DepartmentError::EmptyName));
    assert!(receiver.try_recv().is_err());
}

#[tokio::test]
async fn test_errors_are_mapped_per_resource() {
    let (generic_client, mut receiver) = create_mock_client::<Department>(10);
    let client = DepartmentClient::new(generic_client);

    let task = tokio::spawn(async move {
        let missing = client.delete(DepartmentId(9)).await;
        let rejected = client.set_active(DepartmentId(2), false).await;
        (missing, rejected)
    });

    let (id, respond_to) = expect_delete(&mut receiver).await.unwrap();
    assert_eq!(id, DepartmentId(9));
    respond_to.send(Err(QueryError::Http { status: 404 })).unwrap();

    let (id, update, respond_to) = expect_update(&mut receiver).await.unwrap();
    assert_eq!(id, DepartmentId(2));
    assert_eq!(update.is_active, Some(false));
    assert!(update.name.is_none());
    respond_to
        .send(Err(QueryError::Rejected(
            "Department still has employees".to_string(),
        )))
        .unwrap();

    let (missing, rejected) = task.await.unwrap();
    assert_eq!(missing, Err(DepartmentError::NotFound));
    assert_eq!(
        rejected,
        Err(DepartmentError::Rejected(
            "Department still has employees".to_string()
        ))
    );
}

#[tokio::test]
async fn test_accepted_mutation_without_data_is_reported() {
    let (generic_client, mut receiver) = create_mock_client::<Product>(10);
    let client = ProductClient::new(generic_client);

    let task = tokio::spawn(async move { client.set_stock(ProductId(4), 0).await });

    let (_, update, respond_to) = expect_update(&mut receiver).await.unwrap();
    assert_eq!(update.stock, Some(0));
    respond_to
        .send(Ok(MutationOutcome {
            message: "Updated".to_string(),
            data: None,
        }))
        .unwrap();

    assert_eq!(task.await.unwrap(), Err(ProductError::MissingRecord));
}

#[tokio::test]
async fn test_invalid_prices_never_reach_the_actor() {
    let (generic_client, mut receiver) = create_mock_client::<Product>(10);
    let client = ProductClient::new(generic_client);

    let negative = client.set_price(ProductId(1), -1.0).await;
    assert_eq!(negative, Err(ProductError::InvalidPrice(-1.0)));

    let params = ProductCreate {
        name: "Ghost".to_string(),
        sku: "GH-0".to_string(),
        price: f64::INFINITY,
        stock: 0,
        unit_id: None,
        is_active: true,
    };
    assert!(matches!(
        client.create_product(params).await,
        Err(ProductError::InvalidPrice(_))
    ));

    assert!(receiver.try_recv().is_err());
}

#[tokio::test]
async fn test_closed_actor_is_a_communication_error() {
    let (generic_client, receiver) = create_mock_client::<Department>(10);
    let client = DepartmentClient::new(generic_client);
    drop(receiver);

    let result = client.invalidate().await;
    assert_eq!(
        result,
        Err(DepartmentError::ActorCommunicationError(
            "Actor closed".to_string()
        ))
    );
}
