//! Tests for [`IrSpec`].

use crate::{
    ir::{IrError, IrObject, IrSchema, IrSchemaKind, IrSpec, ResolverOptions},
    parse::{Document, Method, path::PathFragment},
    tests::assert_matches,
};

fn envelope<'a>(spec: &'a IrSpec, name: &str) -> &'a IrObject {
    let schema = spec
        .schemas
        .iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("expected envelope `{name}`"));
    match &schema.kind {
        IrSchemaKind::Object(object) => object,
        other => panic!("expected `{name}` to be an object; got `{other:?}`"),
    }
}

fn names(spec: &IrSpec) -> Vec<&str> {
    spec.schemas.iter().map(|s| s.name.as_str()).collect()
}

// MARK: Documents

#[test]
fn test_empty_document() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Empty
          version: 0.1.0
    "})
    .unwrap();

    let spec = IrSpec::from_doc(&doc).unwrap();

    assert_eq!(spec.title, "Empty");
    assert_eq!(spec.version, "0.1.0");
    assert!(spec.schemas.is_empty());
    assert!(spec.operations.is_empty());
}

#[test]
fn test_schema_order() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        paths:
          /pets/{petId}:
            get:
              operationId: getPet
              responses:
                '200':
                  description: OK
                  content:
                    application/json:
                      schema:
                        type: object
                        properties:
                          name:
                            type: string
        components:
          schemas:
            Zebra:
              type: string
            Aardvark:
              type: integer
    "})
    .unwrap();

    let spec = IrSpec::from_doc(&doc).unwrap();

    assert_eq!(
        names(&spec),
        ["Zebra", "Aardvark", "GetPetResponse", "GetPetRequest"]
    );
}

#[test]
fn test_resolution_is_repeatable() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        paths:
          /pets:
            get:
              operationId: listPets
              parameters:
                - $ref: '#/components/parameters/limit'
              responses:
                '200':
                  description: OK
                  content:
                    application/json:
                      schema:
                        type: array
                        items:
                          $ref: '#/components/schemas/Pet'
        components:
          parameters:
            limit:
              name: limit
              in: query
              schema:
                type: integer
          schemas:
            Pet:
              type: object
              properties:
                name:
                  type: string
    "})
    .unwrap();

    let first = IrSpec::from_doc(&doc).unwrap();
    let second = IrSpec::from_doc(&doc).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_top_level_array_of_objects_is_split() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        components:
          schemas:
            Pets:
              type: array
              items:
                type: object
                properties:
                  name:
                    type: string
            Names:
              type: array
              items:
                type: string
    "})
    .unwrap();

    let spec = IrSpec::from_doc(&doc).unwrap();

    assert_eq!(names(&spec), ["PetsItem", "Pets", "Names"]);
    assert_matches!(
        &*spec.schemas,
        [
            IrSchema {
                repeated: false,
                kind: IrSchemaKind::Object(_),
                ..
            },
            IrSchema {
                repeated: true,
                kind: IrSchemaKind::TypeReference(item),
                ..
            },
            IrSchema {
                repeated: true,
                kind: IrSchemaKind::String,
                ..
            },
        ] if item == "PetsItem",
    );
}

#[test]
fn test_unresolved_reference() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        components:
          schemas:
            Owner:
              type: object
              properties:
                pet:
                  $ref: '#/components/schemas/Pet'
    "})
    .unwrap();

    let result = IrSpec::from_doc(&doc);

    assert_matches!(
        result,
        Err(IrError::UnresolvedReference { referrer, type_name })
            if referrer == "Owner" && type_name == "Pet",
    );
}

#[test]
fn test_reference_to_synthesized_schema() {
    // Envelopes and responses are declared, but they aren't components.
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        paths:
          /pets:
            get:
              operationId: listPets
              responses:
                '200':
                  description: OK
                  content:
                    application/json:
                      schema:
                        $ref: '#/components/schemas/ListPetsRequest'
    "})
    .unwrap();

    let result = IrSpec::from_doc(&doc);

    assert_matches!(
        result,
        Err(IrError::UnresolvedReference { referrer, type_name })
            if referrer == "ListPetsResponse" && type_name == "ListPetsRequest",
    );
}

#[test]
fn test_recursion_limit_option() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Deep
          version: 1.0.0
        components:
          schemas:
            Outer:
              type: object
              properties:
                inner:
                  type: object
                  properties:
                    leaf:
                      type: string
    "})
    .unwrap();

    assert_matches!(IrSpec::from_doc(&doc), Ok(_));
    assert_matches!(
        IrSpec::from_doc_with_options(&doc, ResolverOptions { max_depth: 1 }),
        Err(IrError::RecursionLimit { limit: 1, .. }),
    );
}

// MARK: Operations

#[test]
fn test_operation_fields() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        paths:
          /pets/{petId}/toys:
            get:
              operationId: list_pet_toys
              summary: Lists a pet's toys.
              parameters:
                - name: petId
                  in: path
                  schema:
                    type: string
                - name: limit
                  in: query
                  schema:
                    type: integer
                    default: 20
                - name: X-Trace
                  in: header
                  schema:
                    type: string
              responses:
                '200':
                  description: OK
                  content:
                    application/json:
                      schema:
                        type: array
                        items:
                          type: string
    "})
    .unwrap();

    let spec = IrSpec::from_doc(&doc).unwrap();

    let [op] = &*spec.operations else {
        panic!("expected one operation; got `{:?}`", spec.operations);
    };
    assert_eq!(op.name, "list_pet_toys");
    assert_eq!(op.path, "/pets/{petId}/toys");
    assert_eq!(op.method, Method::Get);
    assert_eq!(op.request, "ListPetToysRequest");
    assert_eq!(op.summary.as_deref(), Some("Lists a pet's toys."));
    assert_eq!(op.path_params, ["petId"]);
    assert_eq!(op.query_params, ["limit"]);
    assert!(!op.has_body);
    assert_matches!(
        &op.response,
        Some(IrSchema {
            name,
            repeated: true,
            kind: IrSchemaKind::String,
            ..
        }) if name == "ListPetToysResponse",
    );
    assert_matches!(
        &*op.segments[1].fragments(),
        [PathFragment::Param(param)] if param == "petId",
    );

    let request = envelope(&spec, "ListPetToysRequest");
    let keys: Vec<_> = request.properties.keys().map(String::as_str).collect();
    assert_eq!(keys, ["petId", "limit"]);
    // Path parameters are always required.
    assert!(request.properties["petId"].required);
    assert!(!request.properties["limit"].required);
    assert_eq!(
        request.properties["limit"].default,
        Some(serde_json::json!(20))
    );
}

#[test]
fn test_operations_follow_method_order() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        paths:
          /pets:
            delete:
              operationId: deletePets
              responses:
                '204':
                  description: Deleted
            post:
              operationId: createPet
              responses:
                '204':
                  description: Created
            get:
              operationId: listPets
              responses:
                '200':
                  description: OK
                  content:
                    application/json:
                      schema:
                        type: string
          /owners:
            get:
              operationId: listOwners
              responses:
                '200':
                  description: OK
                  content:
                    application/json:
                      schema:
                        type: string
    "})
    .unwrap();

    let spec = IrSpec::from_doc(&doc).unwrap();

    // Paths keep document order; methods within a path don't.
    let names: Vec<_> = spec.operations.iter().map(|op| op.name.as_str()).collect();
    assert_eq!(names, ["listPets", "createPet", "deletePets", "listOwners"]);
}

#[test]
fn test_missing_operation_id() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        paths:
          /pets:
            get:
              responses:
                '200':
                  description: OK
                  content:
                    application/json:
                      schema:
                        type: string
    "})
    .unwrap();

    let result = IrSpec::from_doc(&doc);

    assert_matches!(
        result,
        Err(IrError::MissingOperationId {
            method: Method::Get,
            path,
        }) if path == "/pets",
    );
}

#[test]
fn test_unsupported_verb() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        paths:
          /pets:
            head:
              operationId: checkPets
              responses:
                '200':
                  description: OK
                  content:
                    application/json:
                      schema:
                        type: string
    "})
    .unwrap();

    let result = IrSpec::from_doc(&doc);

    assert_matches!(
        result,
        Err(IrError::UnsupportedVerb {
            method: Method::Head,
            ..
        }),
    );
}

#[test]
fn test_bad_operation_path() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        paths:
          /pets/{petId:
            delete:
              operationId: deletePet
              responses:
                '204':
                  description: Deleted
    "})
    .unwrap();

    let result = IrSpec::from_doc(&doc);

    assert_matches!(
        result,
        Err(IrError::BadOperationPath { operation, .. }) if operation == "deletePet",
    );
}

// MARK: Responses

#[test]
fn test_delete_with_no_content() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        paths:
          /pets/{petId}:
            delete:
              operationId: deletePet
              parameters:
                - name: petId
                  in: path
                  required: true
                  schema:
                    type: string
              responses:
                '204':
                  description: Deleted
    "})
    .unwrap();

    let spec = IrSpec::from_doc(&doc).unwrap();

    assert_eq!(spec.operations[0].response, None);
    assert_eq!(names(&spec), ["DeletePetRequest"]);
}

#[test]
fn test_conventional_response_is_picked() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        paths:
          /pets/{petId}:
            get:
              operationId: getPet
              responses:
                '404':
                  description: Not found
                  content:
                    application/json:
                      schema:
                        $ref: '#/components/schemas/Error'
                '200':
                  description: OK
                  content:
                    application/json:
                      schema:
                        $ref: '#/components/schemas/Pet'
        components:
          schemas:
            Pet:
              type: object
            Error:
              type: object
    "})
    .unwrap();

    let spec = IrSpec::from_doc(&doc).unwrap();

    assert_eq!(
        spec.operations[0].response,
        Some(IrSchema::new(
            "GetPetResponse",
            IrSchemaKind::TypeReference("Pet".into())
        ))
    );
    // References aren't declared again.
    assert_eq!(names(&spec), ["Pet", "Error", "GetPetRequest"]);
}

#[test]
fn test_no_conventional_response() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        paths:
          /pets:
            post:
              operationId: createPet
              responses:
                '202':
                  description: Accepted
    "})
    .unwrap();

    let result = IrSpec::from_doc(&doc);

    assert_matches!(
        result,
        Err(IrError::NoConventionalResponse { operation, codes })
            if operation == "createPet" && codes == "200, 201, 204",
    );
}

#[test]
fn test_response_without_json_content() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        paths:
          /pets/export:
            get:
              operationId: exportPets
              responses:
                '200':
                  description: OK
                  content:
                    text/csv:
                      schema:
                        type: string
    "})
    .unwrap();

    let result = IrSpec::from_doc(&doc);

    assert_matches!(
        result,
        Err(IrError::NoJsonContent { operation, location })
            if operation == "exportPets" && location == "response",
    );
}

#[test]
fn test_response_ref() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        paths:
          /pets:
            put:
              operationId: replacePets
              responses:
                '200':
                  $ref: '#/components/responses/PetCount'
          /owners:
            put:
              operationId: replaceOwners
              responses:
                '200':
                  $ref: '#/components/responses/Missing'
        components:
          responses:
            PetCount:
              description: OK
              content:
                application/json:
                  schema:
                    type: integer
    "})
    .unwrap();

    let result = IrSpec::from_doc(&doc);

    assert_matches!(
        result,
        Err(IrError::UnresolvedResponse { reference })
            if reference == "#/components/responses/Missing",
    );
}

// MARK: Parameters

#[test]
fn test_global_parameters() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        paths:
          /pets:
            get:
              operationId: listPets
              parameters:
                - $ref: '#/components/parameters/limit'
              responses:
                '200':
                  description: OK
                  content:
                    application/json:
                      schema:
                        type: string
        components:
          parameters:
            limit:
              name: limit
              in: query
              required: true
              schema:
                type: integer
    "})
    .unwrap();

    let spec = IrSpec::from_doc(&doc).unwrap();

    assert_eq!(spec.operations[0].query_params, ["limit"]);
    let request = envelope(&spec, "ListPetsRequest");
    assert_matches!(
        &request.properties["limit"],
        crate::ir::IrProperty {
            required: true,
            schema: IrSchema {
                kind: IrSchemaKind::Numeric,
                ..
            },
            ..
        },
    );
}

#[test]
fn test_missing_global_parameter() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        paths:
          /pets:
            get:
              operationId: listPets
              parameters:
                - $ref: '#/components/parameters/offset'
              responses:
                '200':
                  description: OK
                  content:
                    application/json:
                      schema:
                        type: string
    "})
    .unwrap();

    let result = IrSpec::from_doc(&doc);

    assert_matches!(
        result,
        Err(IrError::UnresolvedGlobalParameter { reference })
            if reference == "#/components/parameters/offset",
    );
}

#[test]
fn test_path_level_parameters_are_merged() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        paths:
          /pets/{petId}:
            parameters:
              - name: petId
                in: path
                schema:
                  type: string
              - name: verbose
                in: query
                schema:
                  type: boolean
            get:
              operationId: getPet
              parameters:
                - name: verbose
                  in: query
                  description: Include everything.
                  schema:
                    type: string
                - name: fields
                  in: query
                  schema:
                    type: string
              responses:
                '200':
                  description: OK
                  content:
                    application/json:
                      schema:
                        type: string
    "})
    .unwrap();

    let spec = IrSpec::from_doc(&doc).unwrap();

    let op = &spec.operations[0];
    assert_eq!(op.path_params, ["petId"]);
    assert_eq!(op.query_params, ["verbose", "fields"]);
    let request = envelope(&spec, "GetPetRequest");
    assert_eq!(request.properties["verbose"].schema.kind, IrSchemaKind::String);
    assert_eq!(
        request.properties["verbose"].description.as_deref(),
        Some("Include everything.")
    );
}

#[test]
fn test_parameter_without_schema() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        paths:
          /pets:
            get:
              operationId: listPets
              parameters:
                - name: q
                  in: query
              responses:
                '200':
                  description: OK
                  content:
                    application/json:
                      schema:
                        type: string
    "})
    .unwrap();

    let result = IrSpec::from_doc(&doc);

    assert_matches!(
        result,
        Err(IrError::UnresolvableSchema { name }) if name == "ListPetsRequest.q",
    );
}

#[test]
fn test_global_parameter_ref_outside_parameters() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        paths:
          /pets:
            post:
              operationId: createPet
              parameters:
                - $ref: '#/components/schemas/limit'
              responses:
                '204':
                  description: No content
        components:
          parameters:
            limit:
              name: limit
              in: query
              schema:
                type: integer
    "})
    .unwrap();

    let result = IrSpec::from_doc(&doc);

    assert_matches!(
        result,
        Err(IrError::UnresolvedGlobalParameter { reference })
            if reference == "#/components/schemas/limit",
    );
}

// MARK: Request bodies

#[test]
fn test_inline_body_is_hoisted() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        paths:
          /pets:
            post:
              operationId: createPet
              requestBody:
                required: true
                description: The new pet.
                content:
                  application/json:
                    schema:
                      type: object
                      properties:
                        name:
                          type: string
              responses:
                '201':
                  description: Created
                  content:
                    application/json:
                      schema:
                        type: object
                        properties:
                          id:
                            type: integer
    "})
    .unwrap();

    let spec = IrSpec::from_doc(&doc).unwrap();

    let op = &spec.operations[0];
    assert!(op.has_body);
    assert_eq!(names(&spec), ["CreatePetResponse", "CreatePetRequest"]);

    let request = envelope(&spec, "CreatePetRequest");
    let body = &request.properties["body"];
    assert!(body.required);
    assert_eq!(body.description.as_deref(), Some("The new pet."));
    assert_eq!(body.schema.name, "Body");
    let hoisted: Vec<_> = request.schemas.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(hoisted, ["Body"]);
}

#[test]
fn test_body_ref() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        paths:
          /pets/{petId}:
            patch:
              operationId: updatePet
              parameters:
                - name: petId
                  in: path
                  required: true
                  schema:
                    type: string
              requestBody:
                $ref: '#/components/requestBodies/PetPatch'
              responses:
                '204':
                  description: Updated
        components:
          requestBodies:
            PetPatch:
              content:
                application/json:
                  schema:
                    $ref: '#/components/schemas/Pet'
          schemas:
            Pet:
              type: object
    "})
    .unwrap();

    let spec = IrSpec::from_doc(&doc).unwrap();

    let request = envelope(&spec, "UpdatePetRequest");
    assert_eq!(
        request.properties.keys().map(String::as_str).collect::<Vec<_>>(),
        ["petId", "body"]
    );
    assert!(!request.properties["body"].required);
    assert_eq!(
        request.properties["body"].schema.kind,
        IrSchemaKind::TypeReference("Pet".into())
    );
    assert!(request.schemas.is_empty());
}

#[test]
fn test_body_without_json_content() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        paths:
          /pets/{petId}/photo:
            put:
              operationId: uploadPhoto
              requestBody:
                content:
                  image/png:
                    schema:
                      type: string
              responses:
                '204':
                  description: Uploaded
    "})
    .unwrap();

    let result = IrSpec::from_doc(&doc);

    assert_matches!(
        result,
        Err(IrError::NoJsonContent {
            location: "request body",
            ..
        }),
    );
}

#[test]
fn test_query_parameter_named_like_body() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        paths:
          /pets:
            post:
              operationId: createPet
              parameters:
                - name: body
                  in: query
                  schema:
                    type: string
              requestBody:
                content:
                  application/json:
                    schema:
                      type: string
              responses:
                '204':
                  description: Created
    "})
    .unwrap();

    let result = IrSpec::from_doc(&doc);

    assert_matches!(
        result,
        Err(IrError::ConflictingInput { operation, name })
            if operation == "createPet" && name == "body",
    );
}

#[test]
fn test_path_and_query_parameters_with_the_same_name() {
    let doc = Document::from_yaml(indoc::indoc! {"
        openapi: 3.0.0
        info:
          title: Pets
          version: 1.0.0
        paths:
          /pets/{id}:
            delete:
              operationId: deletePet
              parameters:
                - name: id
                  in: path
                  schema:
                    type: string
                - name: id
                  in: query
                  schema:
                    type: string
              responses:
                '204':
                  description: Deleted
    "})
    .unwrap();

    let result = IrSpec::from_doc(&doc);

    assert_matches!(
        result,
        Err(IrError::ConflictingInput { operation, name })
            if operation == "deletePet" && name == "id",
    );
}
